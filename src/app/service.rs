//! Synth service: the application core behind the touch surface.
//!
//! [`SynthService`] owns the current mode, the touch mapper and the output
//! ports.  The main loop feeds it touch frames; the gesture dispatcher
//! rotates its mode.  All I/O flows through port traits, making the
//! service testable with mock adapters.
//!
//! ```text
//!  TouchFrame ──▶ ┌──────────────────────┐ ──▶ SynthSink
//!                 │     SynthService      │ ──▶ IndicatorPort
//!  rotate_mode ──▶│  Mode · TouchMapper   │ ──▶ EventSink
//!                 └──────────────────────┘
//! ```

use log::info;

use crate::config::SynthConfig;
use crate::synth::touch_map::TouchMapper;
use crate::synth::{Mode, SynthCommand, TouchFrame, INSTRUMENT_CHANNEL};

use super::events::AppEvent;
use super::ports::{Colour, EventSink, IndicatorPort, SynthSink};

pub struct SynthService<S, I, E> {
    cfg: SynthConfig,
    mode: Mode,
    mapper: TouchMapper,
    synth: S,
    indicator: I,
    events: E,
}

impl<S: SynthSink, I: IndicatorPort, E: EventSink> SynthService<S, I, E> {
    /// Construct the service.  Nothing is sent until [`start`](Self::start).
    pub fn new(cfg: SynthConfig, synth: S, indicator: I, events: E) -> Self {
        Self {
            cfg,
            mode: cfg.initial_mode,
            mapper: TouchMapper::new(cfg),
            synth,
            indicator,
            events,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Silence the synth and enter the configured initial mode.
    pub fn start(&mut self) {
        self.silence();
        self.mode = self.cfg.initial_mode;
        self.enter_mode();
        self.indicator.show(Colour::Red);
        self.events.emit(&AppEvent::Started(self.mode));
        info!("synth: started in {:?}", self.mode);
    }

    // ── Operations ────────────────────────────────────────────

    /// Advance to the next mode, silencing whatever is sounding first.
    pub fn rotate_mode(&mut self) {
        let from = self.mode;
        self.silence();
        self.mode = from.next();
        self.enter_mode();
        self.indicator.show(Colour::Red);
        self.events.emit(&AppEvent::ModeChanged {
            from,
            to: self.mode,
        });
        info!("synth: mode {:?} -> {:?}", from, self.mode);
    }

    /// Map one touch frame captured `elapsed_ms` after the previous one.
    pub fn handle_frame(&mut self, frame: &TouchFrame, elapsed_ms: u32) {
        let out = self.mapper.map_frame(self.mode, frame, elapsed_ms);
        for cmd in &out.commands {
            self.synth.send(cmd);
        }
        if let Some(sounding) = out.sound_toggled {
            self.indicator.show(if sounding { Colour::Green } else { Colour::Red });
            self.events.emit(&AppEvent::SoundToggled(sounding));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_sounding(&self) -> bool {
        self.mapper.is_sounding()
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    // ── Internal ──────────────────────────────────────────────

    fn silence(&mut self) {
        for cmd in self.mapper.silence() {
            self.synth.send(&cmd);
        }
    }

    fn enter_mode(&mut self) {
        if self.mode == Mode::VolumeInstrument {
            self.synth.send(&SynthCommand::ProgramChange {
                channel: INSTRUMENT_CHANNEL,
                program: self.cfg.instrument_program,
            });
        }
    }
}
