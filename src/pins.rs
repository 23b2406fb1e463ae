//! GPIO / peripheral pin assignments for the TouchSynth board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Mode button
// ---------------------------------------------------------------------------

/// Momentary switch to ground with the internal pull-up enabled.
/// LOW = pressed.  Both edges raise the button interrupt.
pub const BUTTON_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Status LED (discrete RGB, common anode)
// ---------------------------------------------------------------------------

/// Active LOW: driving the pin low lights the LED.
pub const LED_R_GPIO: i32 = 22;
pub const LED_G_GPIO: i32 = 21;
pub const LED_B_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Capacitive touch controller (MPR121 on I2C0)
// ---------------------------------------------------------------------------

pub const TOUCH_SDA_GPIO: i32 = 18;
pub const TOUCH_SCL_GPIO: i32 = 19;
/// I2C bus clock.
pub const TOUCH_I2C_HZ: u32 = 400_000;
