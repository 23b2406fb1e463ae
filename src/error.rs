//! Unified error types for the TouchSynth firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boot sequence's error handling uniform.  All variants are `Copy` so they
//! can be passed around without allocation.

use core::fmt;

use crate::app::ports::TouchError;
use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// The one-shot gesture timer could not be created or armed.
    /// Carries the raw ESP-IDF return code (`0` on the host).
    Timer(i32),
    /// GPIO configuration or ISR registration failed.
    Gpio(i32),
    /// The capacitive touch controller reported a fault.
    Touch(TouchError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Timer(rc) => write!(f, "timer: rc={rc}"),
            Self::Gpio(rc) => write!(f, "gpio: rc={rc}"),
            Self::Touch(e) => write!(f, "touch: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TouchError> for Error {
    fn from(e: TouchError) -> Self {
        Self::Touch(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
