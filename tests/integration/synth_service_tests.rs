//! Integration tests for the touch frame → SynthService → synth sink
//! pipeline, including mode rotation through the gesture dispatcher.

use std::sync::{Arc, Mutex};

use touchsynth::app::dispatch::GestureActions;
use touchsynth::app::events::AppEvent;
use touchsynth::app::ports::{Colour, GestureDispatch};
use touchsynth::app::service::SynthService;
use touchsynth::config::SynthConfig;
use touchsynth::synth::{Mode, TouchFrame, ELECTRODE_COUNT};

use crate::mock_hw::{LogSink, MockIndicator, RecordingSink, RecordingSystem};

const TICK_MS: u32 = 10;

type Service = SynthService<RecordingSink, MockIndicator, LogSink>;

fn started(initial_mode: Mode) -> Service {
    let cfg = SynthConfig {
        initial_mode,
        ..SynthConfig::default()
    };
    let mut svc = SynthService::new(
        cfg,
        RecordingSink::new(),
        MockIndicator::default(),
        LogSink::new(),
    );
    svc.start();
    svc
}

fn quiet_frame() -> TouchFrame {
    TouchFrame {
        touched: 0,
        filtered: [700; ELECTRODE_COUNT],
        baseline: [700; ELECTRODE_COUNT],
    }
}

/// Run idle frames long enough for every refractory counter to expire.
fn settle(svc: &mut Service) {
    for _ in 0..20 {
        svc.handle_frame(&quiet_frame(), TICK_MS);
    }
}

fn lines_after(svc: &Service, start: usize) -> Vec<String> {
    svc.synth().lines[start..].to_vec()
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_silences_both_channels_and_shows_red() {
    let svc = started(Mode::Percussion);

    assert_eq!(svc.synth().lines, vec!["cc 0 123 0", "cc 9 123 0"]);
    assert_eq!(svc.indicator().current(), Some(Colour::Red));
    assert_eq!(svc.events().events, vec![AppEvent::Started(Mode::Percussion)]);
}

#[test]
fn start_in_instrument_mode_selects_program() {
    let svc = started(Mode::VolumeInstrument);
    assert_eq!(svc.synth().lines.last().map(String::as_str), Some("prog 0 50"));
}

// ── Volume / instrument mode ─────────────────────────────────

#[test]
fn toggle_pad_switches_sustained_note_with_expression() {
    let mut svc = started(Mode::VolumeInstrument);
    settle(&mut svc);
    let mark = svc.synth().lines.len();

    // Touch toggle pad 0 while the expression pad sits 75 counts under
    // its baseline: (150 - 75) * 127 / 150 = 63.
    let mut frame = quiet_frame();
    frame.touched = 1 << 0;
    frame.filtered[11] = 625;
    svc.handle_frame(&frame, TICK_MS);

    assert!(svc.is_sounding());
    assert_eq!(lines_after(&svc, mark), vec!["noteon 0 60 100", "cc 0 11 63"]);
    assert_eq!(svc.indicator().current(), Some(Colour::Green));
    assert_eq!(svc.events().events.last(), Some(&AppEvent::SoundToggled(true)));

    // Unchanged pressure sends nothing further.
    let mark = svc.synth().lines.len();
    let mut held = quiet_frame();
    held.filtered[11] = 625;
    svc.handle_frame(&held, TICK_MS);
    assert!(lines_after(&svc, mark).is_empty());

    // The other toggle pad stops the note once past its refractory period.
    settle(&mut svc);
    let mark = svc.synth().lines.len();
    let mut stop = quiet_frame();
    stop.touched = 1 << 3;
    svc.handle_frame(&stop, TICK_MS);

    assert!(!svc.is_sounding());
    assert_eq!(lines_after(&svc, mark), vec!["noteoff 0 60"]);
    assert_eq!(svc.indicator().current(), Some(Colour::Red));
}

// ── Percussion mode ──────────────────────────────────────────

#[test]
fn percussion_pads_strike_and_release() {
    let mut svc = started(Mode::Percussion);
    settle(&mut svc);
    let mark = svc.synth().lines.len();

    let mut hit = quiet_frame();
    hit.filtered[2] = 400;
    svc.handle_frame(&hit, TICK_MS);
    assert_eq!(lines_after(&svc, mark), vec!["noteon 9 65 100"]);

    // Holding the pad does not strike again.
    let mark = svc.synth().lines.len();
    svc.handle_frame(&hit, TICK_MS);
    assert!(lines_after(&svc, mark).is_empty());

    settle(&mut svc);
    assert_eq!(svc.synth().lines.last().map(String::as_str), Some("noteoff 9 65"));
}

// ── Mode rotation via gesture dispatch ───────────────────────

#[test]
fn rotate_mode_silences_sustained_note_first() {
    let svc = Arc::new(Mutex::new(started(Mode::VolumeInstrument)));
    {
        let mut s = svc.lock().unwrap();
        settle(&mut s);
        let mut frame = quiet_frame();
        frame.touched = 1 << 0;
        s.handle_frame(&frame, TICK_MS);
        assert!(s.is_sounding());
    }

    let mut actions =
        GestureActions::new(Arc::clone(&svc), RecordingSystem::default(), LogSink::new());
    actions.rotate_mode();

    let s = svc.lock().unwrap();
    assert!(!s.is_sounding());
    assert_eq!(s.mode(), Mode::Percussion);
    let tail: Vec<&str> = s.synth().lines.iter().rev().take(2).map(String::as_str).collect();
    assert_eq!(tail, vec!["cc 9 123 0", "cc 0 123 0"]);
    assert_eq!(
        s.events().events.last(),
        Some(&AppEvent::ModeChanged {
            from: Mode::VolumeInstrument,
            to: Mode::Percussion,
        })
    );
    assert_eq!(s.indicator().current(), Some(Colour::Red));
}
