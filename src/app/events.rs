//! Outbound application events.
//!
//! The synth service and the gesture dispatcher emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::gesture::Gesture;
use crate::synth::Mode;

/// System-level action requested by a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAction {
    Restart,
    Shutdown,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The synth service has started (carries initial mode).
    Started(Mode),

    /// The button produced a gesture.
    GestureRecognized(Gesture),

    /// The active instrument mode changed.
    ModeChanged { from: Mode, to: Mode },

    /// The sustained instrument note was switched on or off.
    SoundToggled(bool),

    /// A restart or shutdown was requested; `issued` is false if the
    /// platform refused it.
    SystemActionRequested { action: SystemAction, issued: bool },
}
