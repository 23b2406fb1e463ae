//! RGB status LED driver.
//!
//! Three discrete LEDs, each on its own GPIO, wired active-low.  Red marks
//! a fresh mode or silence, green marks sound enabled.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIOs via hw_init.
//! On host/test: tracks state in-memory only.

use crate::app::ports::{Colour, IndicatorPort};
use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    current: Colour,
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            current: Colour::Off,
        }
    }

    pub fn off(&mut self) {
        self.show(Colour::Off);
    }

    pub fn current_colour(&self) -> Colour {
        self.current
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort for StatusLed {
    fn show(&mut self, colour: Colour) {
        let (r, g, b) = colour.channels();
        // Active low.
        hw_init::gpio_write(pins::LED_R_GPIO, !r);
        hw_init::gpio_write(pins::LED_G_GPIO, !g);
        hw_init::gpio_write(pins::LED_B_GPIO, !b);
        self.current = colour;
    }
}
