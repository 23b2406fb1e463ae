//! Console synth sink.
//!
//! Writes one synth command per line to a byte stream, stdout by default.
//! Piped into a FluidSynth shell this plays the notes; on the device it
//! goes out over the console UART.

use std::io::{self, Write};

use log::warn;

use crate::app::ports::SynthSink;
use crate::synth::SynthCommand;

pub struct ConsoleSynthSink<W = io::Stdout> {
    out: W,
}

impl ConsoleSynthSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSynthSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SynthSink for ConsoleSynthSink<W> {
    fn send(&mut self, command: &SynthCommand) {
        // Flushed per line: the synth must hear note-offs immediately.
        if let Err(e) = writeln!(self.out, "{}", command).and_then(|()| self.out.flush()) {
            warn!("synth: write of '{}' failed: {}", command, e);
        }
    }
}
