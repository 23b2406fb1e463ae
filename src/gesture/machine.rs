//! Pure gesture state machine.
//!
//! ```text
//!            press / arm(long, LongPress)
//!   ┌──────┐ ─────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                │ Pressed │
//!   └──────┘ ◀── timeout(LongPress) ─────── └─────────┘
//!     ▲  ▲            => long press              │ release / arm(double, SinglePress)
//!     │  │                                       ▼
//!     │  └──── timeout(SinglePress) ──────  ┌──────────┐
//!     │             => single press         │ Released │
//!     └──── press / disarm ──────────────── └──────────┘
//!               => double press
//! ```
//!
//! No clocks, no locks, no hardware: every transition returns the timer
//! command the caller must apply.  Each arm mints a fresh [`TimerToken`];
//! a timeout is honoured only if its token is the armed one *and* the
//! armed action is the one that belongs to the current state.

use core::num::NonZeroU32;
use core::time::Duration;

use crate::config::GestureTimings;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where in a press/release/press sequence the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    Idle,
    Pressed,
    Released,
}

/// What an expiring timer should be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingAction {
    None,
    SinglePress,
    LongPress,
}

/// A recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    SinglePress,
    DoublePress,
    LongPress,
}

/// Electrical level of the button as read by the bottom half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Pressed,
    Released,
}

/// Identity of one arm of the one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(NonZeroU32);

impl TimerToken {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Rebuild a token from its raw value (e.g. passed through a C callback).
    /// Zero means "nothing armed".
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }
}

/// The single outstanding timer, tagged with its purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    pub action: PendingAction,
}

/// What the caller must do with the hardware timer after an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Arm (replacing any previous arm) for `after`, delivering `token`.
    Arm { after: Duration, token: TimerToken },
    Disarm,
    Leave,
}

/// Result of feeding one edge into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeOutcome {
    pub timer: TimerCommand,
    /// Gesture completed by this edge (only ever a double press).
    pub gesture: Option<Gesture>,
    /// The edge changed the button phase; the soft gate must stay closed
    /// for the debounce lockout.
    pub lockout: bool,
}

impl EdgeOutcome {
    const IGNORED: Self = Self {
        timer: TimerCommand::Leave,
        gesture: None,
        lockout: false,
    };

    pub fn is_transition(&self) -> bool {
        *self != Self::IGNORED
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

pub struct GestureMachine {
    timings: GestureTimings,
    state: GestureState,
    armed: Option<ArmedTimer>,
    last_token: u32,
}

impl GestureMachine {
    pub fn new(timings: GestureTimings) -> Self {
        Self {
            timings,
            state: GestureState::Idle,
            armed: None,
            last_token: 0,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn pending(&self) -> PendingAction {
        self.armed.map_or(PendingAction::None, |a| a.action)
    }

    pub fn armed(&self) -> Option<ArmedTimer> {
        self.armed
    }

    /// Advance on an edge, given the level read *after* the edge.
    pub fn on_edge(&mut self, level: Level) -> EdgeOutcome {
        match (self.state, level) {
            (GestureState::Idle, Level::Pressed) => {
                self.state = GestureState::Pressed;
                let timer = self.arm(self.timings.long_press_window(), PendingAction::LongPress);
                EdgeOutcome {
                    timer,
                    gesture: None,
                    lockout: true,
                }
            }
            (GestureState::Pressed, Level::Released) => {
                self.state = GestureState::Released;
                let timer =
                    self.arm(self.timings.double_press_window(), PendingAction::SinglePress);
                EdgeOutcome {
                    timer,
                    gesture: None,
                    lockout: true,
                }
            }
            // The second press is still held when it completes the gesture,
            // so its chatter needs the same lockout.
            (GestureState::Released, Level::Pressed) => {
                self.state = GestureState::Idle;
                self.armed = None;
                EdgeOutcome {
                    timer: TimerCommand::Disarm,
                    gesture: Some(Gesture::DoublePress),
                    lockout: true,
                }
            }
            // Same level as the phase we are already in: bounce or a
            // coalesced press/release pair.  Nothing to do.
            _ => EdgeOutcome::IGNORED,
        }
    }

    /// Finalise on timer expiry.  Returns the gesture to dispatch, or
    /// `None` if the firing is stale.
    pub fn on_timeout(&mut self, token: TimerToken) -> Option<Gesture> {
        let armed = self.armed.filter(|a| a.token == token)?;

        let gesture = match (self.state, armed.action) {
            (GestureState::Pressed, PendingAction::LongPress) => Gesture::LongPress,
            (GestureState::Released, PendingAction::SinglePress) => Gesture::SinglePress,
            _ => return None,
        };

        self.state = GestureState::Idle;
        self.armed = None;
        Some(gesture)
    }

    fn arm(&mut self, after: Duration, action: PendingAction) -> TimerCommand {
        // Zero is reserved for "nothing armed".
        let token = loop {
            self.last_token = self.last_token.wrapping_add(1);
            if let Some(raw) = NonZeroU32::new(self.last_token) {
                break TimerToken(raw);
            }
        };
        self.armed = Some(ArmedTimer { token, action });
        TimerCommand::Arm { after, token }
    }
}
