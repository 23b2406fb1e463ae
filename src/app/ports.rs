//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GestureCore / SynthService (domain)
//! ```
//!
//! Driven adapters (timer, touch controller, synth output, system control,
//! status indicator, event sinks) implement these traits.  The domain core
//! consumes them via generics, so it never touches hardware directly and
//! every port can be replaced by a recording stub in tests.
//!
//! The button's electrical level and the debounce pause are consumed
//! through `embedded_hal::digital::InputPin` and
//! `embedded_hal::delay::DelayNs` rather than bespoke ports.

use core::fmt;
use core::time::Duration;

use crate::gesture::machine::TimerToken;
use crate::synth::{SynthCommand, TouchFrame};

// ───────────────────────────────────────────────────────────────
// One-shot timer port (domain → timer peripheral)
// ───────────────────────────────────────────────────────────────

/// A single one-shot timer.
///
/// Re-arming replaces any previous arm.  On expiry the implementation
/// delivers the token it was armed with to its [`TimeoutNotifier`], on a
/// path independent of the edge-processing path.
pub trait OneShotTimer {
    fn arm(&mut self, after: Duration, token: TimerToken);

    /// Cancel the outstanding arm, if any.
    fn disarm(&mut self);
}

/// Receiver of timer expiries (the Timeout Notifier).
pub trait TimeoutNotifier: Send + Sync {
    fn on_timeout(&self, token: TimerToken);
}

// ───────────────────────────────────────────────────────────────
// Gesture dispatch port (domain → application)
// ───────────────────────────────────────────────────────────────

/// The three terminal gesture actions.
///
/// Implementations are fire-and-forget: nothing they do is reported back
/// into the gesture state machine.
pub trait GestureDispatch {
    /// Single press: advance to the next instrument mode.
    fn rotate_mode(&mut self);

    /// Double press: ask the system to restart.
    fn request_restart(&mut self);

    /// Long press: ask the system to shut down.
    fn request_shutdown(&mut self);
}

// ───────────────────────────────────────────────────────────────
// System control port (driven adapter: domain → OS / SoC)
// ───────────────────────────────────────────────────────────────

/// Process- or device-level actions.  Either may end the running program
/// before returning.
pub trait SystemControl {
    fn restart(&mut self) -> Result<(), SystemError>;
    fn shutdown(&mut self) -> Result<(), SystemError>;
}

// ───────────────────────────────────────────────────────────────
// Synth output port (driven adapter: domain → synth)
// ───────────────────────────────────────────────────────────────

pub trait SynthSink {
    fn send(&mut self, command: &SynthCommand);
}

// ───────────────────────────────────────────────────────────────
// Touch sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait TouchPort {
    fn read_frame(&mut self) -> Result<TouchFrame, TouchError>;
}

// ───────────────────────────────────────────────────────────────
// Status indicator port
// ───────────────────────────────────────────────────────────────

/// Colours the RGB status LED can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Off,
    Red,
    Green,
}

impl Colour {
    /// `(red, green, blue)` channel states.
    pub fn channels(self) -> (bool, bool, bool) {
        match self {
            Self::Off => (false, false, false),
            Self::Red => (true, false, false),
            Self::Green => (false, true, false),
        }
    }
}

pub trait IndicatorPort {
    fn show(&mut self, colour: Colour);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SystemControl`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemError {
    /// The command or SoC call could not be started.
    SpawnFailed,
}

/// Errors from the touch controller, mirroring its failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    /// No device acknowledged at the configured address.
    AddressUnknown,
    /// A register read back a value other than the one written.
    ReadbackFail,
    /// Over-current detected on the REXT pin.
    OvercurrentFlag,
    /// An electrode reading is out of range.
    OutOfRange,
    /// Read attempted before successful initialisation.
    NotInited,
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "system command could not be started"),
        }
    }
}

impl fmt::Display for TouchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressUnknown => write!(f, "incorrect address"),
            Self::ReadbackFail => write!(f, "readback failure"),
            Self::OvercurrentFlag => write!(f, "overcurrent on REXT pin"),
            Self::OutOfRange => write!(f, "electrode out of range"),
            Self::NotInited => write!(f, "not initialised"),
        }
    }
}
