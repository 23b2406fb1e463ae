//! Bottom-half edge handler.
//!
//! Runs from the main loop, outside interrupt context, so the gesture
//! dispatch it may trigger can do ordinary (non-reentrant) work.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::{GestureDispatch, OneShotTimer};

use super::{EdgeLatch, EdgeOutcome, GestureCore, Level};

/// Owns the button input, the one-shot timer and the debounce delay.
///
/// The pin reads *low* while the button is held (active-low switch with
/// pull-up).
pub struct ButtonBottomHalf<'a, P, T, Dl> {
    latch: &'a EdgeLatch,
    pin: P,
    timer: T,
    delay: Dl,
    debounce_us: u32,
}

impl<'a, P, T, Dl> ButtonBottomHalf<'a, P, T, Dl>
where
    P: InputPin,
    T: OneShotTimer,
    Dl: DelayNs,
{
    pub fn new(latch: &'a EdgeLatch, pin: P, timer: T, delay: Dl, debounce: Duration) -> Self {
        Self {
            latch,
            pin,
            timer,
            delay,
            debounce_us: u32::try_from(debounce.as_micros()).unwrap_or(u32::MAX),
        }
    }

    /// Service the pending edge, if any.  Call once per main-loop iteration.
    ///
    /// The soft gate is closed for the whole of the handler; after an edge
    /// that changes the button phase it stays closed for the debounce
    /// lockout so contact chatter cannot register.
    pub fn poll<D: GestureDispatch>(&mut self, core: &GestureCore<D>) -> Option<EdgeOutcome> {
        if !self.latch.take() {
            return None;
        }
        self.latch.close_gate();

        let level = match self.pin.is_low() {
            Ok(true) => Level::Pressed,
            Ok(false) => Level::Released,
            Err(e) => {
                warn!("gesture: button level read failed ({:?}), edge dropped", e);
                self.latch.open_gate();
                return None;
            }
        };

        let outcome = core.on_edge(level, &mut self.timer);
        if outcome.lockout {
            self.delay.delay_us(self.debounce_us);
        }
        self.latch.open_gate();
        Some(outcome)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    pub fn delay(&self) -> &Dl {
        &self.delay
    }
}
