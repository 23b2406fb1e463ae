//! Mode button: interrupt top half and level input.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO interrupt fires on
//! both edges; the ISR only raises [`BUTTON_LATCH`] (subject to the soft
//! gate).  Everything else happens in the bottom half, which reads the
//! level through [`ButtonPin`].
//!
//! ## Gesture detection
//!
//! | Gesture      | Condition                                   | Action        |
//! |--------------|---------------------------------------------|---------------|
//! | Single press | Release, no second press within 300 ms      | Rotate mode   |
//! | Double press | Second press within 300 ms of the release   | Restart       |
//! | Long press   | Held for 750 ms                             | Shutdown      |

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::gesture::EdgeLatch;

/// Raw edge flag + soft gate for the one mode button.
/// Written by the ISR, consumed by the main loop.
pub static BUTTON_LATCH: EdgeLatch = EdgeLatch::new();

/// ISR handler; register this on the button GPIO, any edge.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn button_isr_handler() {
    BUTTON_LATCH.notify_edge();
}

/// The button's GPIO as an `embedded-hal` input.  Reads low while held.
pub struct ButtonPin {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl ButtonPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for ButtonPin {
    type Error = Infallible;
}

#[cfg(target_os = "espidf")]
impl InputPin for ButtonPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(crate::drivers::hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!crate::drivers::hw_init::gpio_read(self.gpio))
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_PRESSED: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);

/// Drive the simulated button level and raise the edge interrupt.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressed(pressed: bool) {
    SIM_PRESSED.store(pressed, core::sync::atomic::Ordering::Release);
    button_isr_handler();
}

#[cfg(not(target_os = "espidf"))]
impl InputPin for ButtonPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!SIM_PRESSED.load(core::sync::atomic::Ordering::Acquire))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(SIM_PRESSED.load(core::sync::atomic::Ordering::Acquire))
    }
}
