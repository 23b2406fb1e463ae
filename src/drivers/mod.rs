//! Hardware drivers: GPIO initialisation, the button interrupt, the
//! gesture one-shot timer, the status LED and the touch controller.

pub mod button;
pub mod hw_init;
pub mod mpr121;
pub mod one_shot;
pub mod status_led;
