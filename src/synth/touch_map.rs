//! Touch frame → synth command mapping.
//!
//! Each electrode carries a refractory counter advanced by the poll
//! interval every frame.  An electrode only acts once its counter passes
//! the active mode's update delay, which keeps a single touch from
//! re-triggering on every loop iteration.

use heapless::Vec;

use crate::config::SynthConfig;

use super::{
    pressure_to_velocity, Mode, SynthCommand, TouchFrame, CC_EXPRESSION, ELECTRODE_COUNT,
    INSTRUMENT_CHANNEL, NOTE_VELOCITY, PERCUSSION_CHANNEL, SUSTAIN_KEY,
};

/// Upper bound on commands produced by a single frame.
pub const MAX_FRAME_COMMANDS: usize = 16;

/// Counters above this are folded back to `COUNTER_FOLD_TO` so they never overflow.
const COUNTER_CEILING_MS: u32 = 20_000;
const COUNTER_FOLD_TO: u32 = 500;

/// Highest percussion key; electrode `i` plays `PERCUSSION_TOP_KEY - 3 * i`.
const PERCUSSION_TOP_KEY: u8 = 71;

/// Commands for one frame plus whether the sustained note was toggled.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FrameOutput {
    pub commands: Vec<SynthCommand, MAX_FRAME_COMMANDS>,
    /// `Some(true)` = sustained note now sounding, `Some(false)` = stopped.
    pub sound_toggled: Option<bool>,
}

pub struct TouchMapper {
    cfg: SynthConfig,
    counters_ms: [u32; ELECTRODE_COUNT],
    pad_down: [bool; ELECTRODE_COUNT],
    sounding: bool,
    last_expression: Option<u8>,
}

impl TouchMapper {
    pub fn new(cfg: SynthConfig) -> Self {
        Self {
            cfg,
            counters_ms: [0; ELECTRODE_COUNT],
            pad_down: [false; ELECTRODE_COUNT],
            sounding: false,
            last_expression: None,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Process one frame captured `elapsed_ms` after the previous one.
    pub fn map_frame(&mut self, mode: Mode, frame: &TouchFrame, elapsed_ms: u32) -> FrameOutput {
        for counter in &mut self.counters_ms {
            *counter = counter.saturating_add(elapsed_ms);
            if *counter > COUNTER_CEILING_MS {
                *counter = COUNTER_FOLD_TO;
            }
        }

        let mut out = FrameOutput::default();
        match mode {
            Mode::VolumeInstrument => self.map_volume_instrument(frame, &mut out),
            Mode::Percussion => self.map_percussion(frame, &mut out),
        }
        out
    }

    /// Stop everything that may be sounding and forget per-pad state.
    pub fn silence(&mut self) -> [SynthCommand; 2] {
        self.sounding = false;
        self.pad_down = [false; ELECTRODE_COUNT];
        self.last_expression = None;
        [
            SynthCommand::all_notes_off(INSTRUMENT_CHANNEL),
            SynthCommand::all_notes_off(PERCUSSION_CHANNEL),
        ]
    }

    fn map_volume_instrument(&mut self, frame: &TouchFrame, out: &mut FrameOutput) {
        let delay = Mode::VolumeInstrument.update_delay_ms(&self.cfg);

        for electrode in self.cfg.toggle_electrodes.map(usize::from) {
            if frame.is_touched(electrode) && self.counters_ms[electrode] > delay {
                let cmd = if self.sounding {
                    SynthCommand::NoteOff {
                        channel: INSTRUMENT_CHANNEL,
                        key: SUSTAIN_KEY,
                    }
                } else {
                    SynthCommand::NoteOn {
                        channel: INSTRUMENT_CHANNEL,
                        key: SUSTAIN_KEY,
                        velocity: NOTE_VELOCITY,
                    }
                };
                self.sounding = !self.sounding;
                self.counters_ms[electrode] = 0;
                push(out, cmd);
                out.sound_toggled = Some(self.sounding);
            }
        }

        if self.sounding {
            let e = usize::from(self.cfg.expression_electrode);
            let value =
                pressure_to_velocity(frame.baseline[e], frame.filtered[e], self.cfg.pressure_limit);
            if self.last_expression != Some(value) {
                self.last_expression = Some(value);
                push(
                    out,
                    SynthCommand::ControlChange {
                        channel: INSTRUMENT_CHANNEL,
                        controller: CC_EXPRESSION,
                        value,
                    },
                );
            }
        }
    }

    fn map_percussion(&mut self, frame: &TouchFrame, out: &mut FrameOutput) {
        let delay = Mode::Percussion.update_delay_ms(&self.cfg);
        let threshold = self.cfg.percussion_threshold;

        for pad in 0..ELECTRODE_COUNT {
            if self.counters_ms[pad] <= delay {
                continue;
            }
            let key = PERCUSSION_TOP_KEY - 3 * pad as u8;
            let level = frame.filtered[pad];

            // Pads keep their counters running; only the toggles reset theirs.
            if !self.pad_down[pad] && level < threshold {
                self.pad_down[pad] = true;
                push(
                    out,
                    SynthCommand::NoteOn {
                        channel: PERCUSSION_CHANNEL,
                        key,
                        velocity: NOTE_VELOCITY,
                    },
                );
            } else if self.pad_down[pad] && level > threshold {
                self.pad_down[pad] = false;
                push(
                    out,
                    SynthCommand::NoteOff {
                        channel: PERCUSSION_CHANNEL,
                        key,
                    },
                );
            }
        }
    }
}

fn push(out: &mut FrameOutput, cmd: SynthCommand) {
    if out.commands.push(cmd).is_err() {
        log::warn!("synth: frame command buffer full, dropping {}", cmd);
    }
}
