//! Mock hardware adapters for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real GPIO, timers or processes.

#![allow(dead_code)]

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

use touchsynth::app::events::{AppEvent, SystemAction};
use touchsynth::app::ports::{
    Colour, EventSink, IndicatorPort, OneShotTimer, SynthSink, SystemControl, SystemError,
};
use touchsynth::gesture::{EdgeLatch, TimerToken};
use touchsynth::synth::SynthCommand;

// ── MockTimer ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    Arm { after: Duration, token: TimerToken },
    Disarm,
}

/// One-shot timer that never fires on its own; tests deliver expiries
/// by hand through `GestureCore::handle_timeout`.
#[derive(Default)]
pub struct MockTimer {
    pub calls: Vec<TimerCall>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding arm, if the last call was an arm.
    pub fn armed(&self) -> Option<(Duration, TimerToken)> {
        match self.calls.last() {
            Some(TimerCall::Arm { after, token }) => Some((*after, *token)),
            _ => None,
        }
    }

    pub fn armed_token(&self) -> Option<TimerToken> {
        self.armed().map(|(_, token)| token)
    }
}

impl OneShotTimer for MockTimer {
    fn arm(&mut self, after: Duration, token: TimerToken) {
        self.calls.push(TimerCall::Arm { after, token });
    }

    fn disarm(&mut self) {
        self.calls.push(TimerCall::Disarm);
    }
}

// ── MockPin ───────────────────────────────────────────────────

/// Button level as the bottom half sees it.  Active low: `pressed`
/// reads as low.
#[derive(Default)]
pub struct MockPin {
    pub pressed: bool,
    pub fail: bool,
    pub reads: u32,
}

impl ErrorType for MockPin {
    type Error = ErrorKind;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.reads += 1;
        if self.fail {
            return Err(ErrorKind::Other);
        }
        Ok(self.pressed)
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records debounce pauses.  With `chatter` set, every pause raises that
/// latch the way a bouncing contact would.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub pauses: u32,
    pub chatter: Option<&'static EdgeLatch>,
    pub chatter_accepted: u32,
}

impl MockDelay {
    pub fn with_chatter(latch: &'static EdgeLatch) -> Self {
        Self {
            chatter: Some(latch),
            ..Self::default()
        }
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns)
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.pauses += 1;
        if let Some(latch) = self.chatter {
            if latch.notify_edge() {
                self.chatter_accepted += 1;
            }
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Synth sink keeping every command line as it would be sent.
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }
}

impl SynthSink for RecordingSink {
    fn send(&mut self, command: &SynthCommand) {
        self.lines.push(command.to_string());
    }
}

// ── MockIndicator ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockIndicator {
    pub shown: Vec<Colour>,
}

impl MockIndicator {
    pub fn current(&self) -> Option<Colour> {
        self.shown.last().copied()
    }
}

impl IndicatorPort for MockIndicator {
    fn show(&mut self, colour: Colour) {
        self.shown.push(colour);
    }
}

// ── RecordingSystem ───────────────────────────────────────────

/// System control that only records; with `fail` set every request is
/// refused.
#[derive(Default)]
pub struct RecordingSystem {
    pub calls: Vec<SystemAction>,
    pub fail: bool,
}

impl RecordingSystem {
    pub fn refusing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn record(&mut self, action: SystemAction) -> Result<(), SystemError> {
        self.calls.push(action);
        if self.fail { Err(SystemError::SpawnFailed) } else { Ok(()) }
    }
}

impl SystemControl for RecordingSystem {
    fn restart(&mut self) -> Result<(), SystemError> {
        self.record(SystemAction::Restart)
    }

    fn shutdown(&mut self) -> Result<(), SystemError> {
        self.record(SystemAction::Shutdown)
    }
}

// ── LogSink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
