//! Synth vocabulary: modes, commands, and pressure scaling.
//!
//! Commands render as FluidSynth shell lines (`noteon 9 71 100`,
//! `cc 0 11 64`, ...) so the console adapter can pipe them straight
//! into a running synth.

pub mod touch_map;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;

/// Number of sensing electrodes on the touch controller.
pub const ELECTRODE_COUNT: usize = 12;

/// MIDI channel for the sustained instrument voice.
pub const INSTRUMENT_CHANNEL: u8 = 0;
/// General MIDI percussion channel.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Key and velocity of the sustained note in VolumeInstrument mode.
pub const SUSTAIN_KEY: u8 = 60;
pub const NOTE_VELOCITY: u8 = 100;

pub const CC_EXPRESSION: u8 = 11;
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Lowest velocity the pressure mapping produces, so a light touch still sounds.
pub const MIN_VELOCITY: u8 = 10;
pub const MAX_VELOCITY: u8 = 127;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Instrument modes cycled by a single button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// One sustained note toggled by the toggle electrodes, with pressure
    /// on the expression electrode driving volume.
    VolumeInstrument,
    /// Each electrode is a drum pad.
    Percussion,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::VolumeInstrument, Mode::Percussion];

    /// The following mode, wrapping after the last back to the first.
    pub fn next(self) -> Self {
        match self {
            Self::VolumeInstrument => Self::Percussion,
            Self::Percussion => Self::VolumeInstrument,
        }
    }

    /// Per-electrode refractory period while this mode is active.
    pub fn update_delay_ms(self, cfg: &SynthConfig) -> u32 {
        match self {
            Self::VolumeInstrument => cfg.volume_update_delay_ms,
            Self::Percussion => cfg.percussion_update_delay_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A single synth command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthCommand {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8 },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange { channel: u8, program: u8 },
}

impl SynthCommand {
    pub const fn all_notes_off(channel: u8) -> Self {
        Self::ControlChange {
            channel,
            controller: CC_ALL_NOTES_OFF,
            value: 0,
        }
    }
}

impl fmt::Display for SynthCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoteOn { channel, key, velocity } => {
                write!(f, "noteon {} {} {}", channel, key, velocity)
            }
            Self::NoteOff { channel, key } => write!(f, "noteoff {} {}", channel, key),
            Self::ControlChange { channel, controller, value } => {
                write!(f, "cc {} {} {}", channel, controller, value)
            }
            Self::ProgramChange { channel, program } => write!(f, "prog {} {}", channel, program),
        }
    }
}

// ---------------------------------------------------------------------------
// Touch frame
// ---------------------------------------------------------------------------

/// One snapshot of the touch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchFrame {
    /// Bit `i` set = electrode `i` touched.
    pub touched: u16,
    /// Filtered electrode data (10-bit).
    pub filtered: [u16; ELECTRODE_COUNT],
    /// Baseline electrode data (10-bit).
    pub baseline: [u16; ELECTRODE_COUNT],
}

impl TouchFrame {
    pub fn is_touched(&self, electrode: usize) -> bool {
        electrode < ELECTRODE_COUNT && self.touched & (1 << electrode) != 0
    }
}

// ---------------------------------------------------------------------------
// Pressure scaling
// ---------------------------------------------------------------------------

/// Map the baseline/filtered gap of one electrode onto a MIDI value.
///
/// A wider gap (firmer touch, closer hand) gives a lower value.  The
/// result is clamped into `MIN_VELOCITY..=MAX_VELOCITY`.
pub fn pressure_to_velocity(baseline: u16, filtered: u16, limit: u16) -> u8 {
    let limit = i32::from(limit.max(1));
    let gap = i32::from(baseline) - i32::from(filtered);
    let scaled = (limit - gap) * i32::from(MAX_VELOCITY) / limit;
    scaled.clamp(i32::from(MIN_VELOCITY), i32::from(MAX_VELOCITY)) as u8
}
