//! Integration tests for the button ISR → bottom half → gesture core →
//! dispatcher chain.
//!
//! Edges are raised on the latch by hand, the bottom half reads a mock
//! pin, and timer expiries are delivered explicitly with the token the
//! mock timer was last armed with.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use touchsynth::app::dispatch::GestureActions;
use touchsynth::app::events::{AppEvent, SystemAction};
use touchsynth::app::service::SynthService;
use touchsynth::config::SystemConfig;
use touchsynth::gesture::{
    ButtonBottomHalf, EdgeLatch, EdgeOutcome, Gesture, GestureCore, GestureState, PendingAction,
};
use touchsynth::synth::Mode;

use crate::mock_hw::{
    LogSink, MockDelay, MockIndicator, MockPin, MockTimer, RecordingSink, RecordingSystem,
    TimerCall,
};

type Service = SynthService<RecordingSink, MockIndicator, LogSink>;
type Actions = GestureActions<RecordingSink, MockIndicator, LogSink, RecordingSystem, LogSink>;

struct Rig {
    latch: &'static EdgeLatch,
    service: Arc<Mutex<Service>>,
    core: GestureCore<Actions>,
    button: ButtonBottomHalf<'static, MockPin, MockTimer, MockDelay>,
}

impl Rig {
    fn new() -> Self {
        Self::build(RecordingSystem::default(), false)
    }

    fn build(system: RecordingSystem, chatter: bool) -> Self {
        let config = SystemConfig::default();
        let latch: &'static EdgeLatch = Box::leak(Box::new(EdgeLatch::new()));

        let service = Arc::new(Mutex::new(SynthService::new(
            config.synth,
            RecordingSink::new(),
            MockIndicator::default(),
            LogSink::new(),
        )));
        service.lock().unwrap().start();

        let actions = GestureActions::new(Arc::clone(&service), system, LogSink::new());
        let core = GestureCore::new(config.gesture, actions);

        let delay = if chatter { MockDelay::with_chatter(latch) } else { MockDelay::default() };
        let button = ButtonBottomHalf::new(
            latch,
            MockPin::default(),
            MockTimer::new(),
            delay,
            config.gesture.debounce(),
        );
        Self {
            latch,
            service,
            core,
            button,
        }
    }

    fn edge(&mut self, pressed: bool) -> Option<EdgeOutcome> {
        self.button.pin_mut().pressed = pressed;
        assert!(self.latch.notify_edge(), "gate must be open between polls");
        self.button.poll(&self.core)
    }

    fn press(&mut self) -> Option<EdgeOutcome> {
        self.edge(true)
    }

    fn release(&mut self) -> Option<EdgeOutcome> {
        self.edge(false)
    }

    fn fire_timer(&self) -> Option<Gesture> {
        let token = self.button.timer().armed_token().expect("timer should be armed");
        self.core.handle_timeout(token)
    }

    fn system_calls(&self) -> Vec<SystemAction> {
        self.core.with_dispatcher(|d| d.system().calls.clone())
    }

    fn dispatcher_events(&self) -> Vec<AppEvent> {
        self.core.with_dispatcher(|d| d.events().events.clone())
    }

    fn mode(&self) -> Mode {
        self.service.lock().unwrap().mode()
    }

    fn button_delay(&self) -> &MockDelay {
        self.button.delay()
    }
}

// ── Single press ──────────────────────────────────────────────

#[test]
fn single_press_rotates_mode_after_double_press_window() {
    let mut rig = Rig::new();
    assert_eq!(rig.mode(), Mode::Percussion);

    rig.press();
    assert_eq!(
        rig.button.timer().armed().map(|(after, _)| after),
        Some(Duration::from_millis(750))
    );
    rig.release();
    assert_eq!(
        rig.button.timer().armed().map(|(after, _)| after),
        Some(Duration::from_millis(300))
    );
    assert_eq!(rig.core.pending(), PendingAction::SinglePress);

    assert_eq!(rig.fire_timer(), Some(Gesture::SinglePress));

    assert_eq!(rig.core.state(), GestureState::Idle);
    assert_eq!(rig.mode(), Mode::VolumeInstrument);
    assert!(rig.service.lock().unwrap().synth().contains("prog 0 50"));
    assert_eq!(rig.dispatcher_events(), vec![AppEvent::GestureRecognized(Gesture::SinglePress)]);
    assert!(rig.system_calls().is_empty());
}

#[test]
fn two_single_presses_cycle_back_to_first_mode() {
    let mut rig = Rig::new();
    for _ in 0..2 {
        rig.press();
        rig.release();
        assert_eq!(rig.fire_timer(), Some(Gesture::SinglePress));
    }
    assert_eq!(rig.mode(), Mode::Percussion);
}

// ── Double press ──────────────────────────────────────────────

#[test]
fn double_press_requests_restart_without_rotating() {
    let mut rig = Rig::new();

    rig.press();
    rig.release();
    let outcome = rig.press().expect("edge pending");

    assert_eq!(outcome.gesture, Some(Gesture::DoublePress));
    assert_eq!(rig.button.timer().calls.last(), Some(&TimerCall::Disarm));
    assert_eq!(rig.core.state(), GestureState::Idle);
    assert_eq!(rig.system_calls(), vec![SystemAction::Restart]);
    assert_eq!(rig.mode(), Mode::Percussion);

    // The second release finds the machine idle and changes nothing.
    let calls_before = rig.button.timer().calls.len();
    rig.release();
    assert_eq!(rig.button.timer().calls.len(), calls_before);
    assert_eq!(rig.core.state(), GestureState::Idle);
}

#[test]
fn superseded_single_press_timer_is_ignored() {
    let mut rig = Rig::new();

    rig.press();
    rig.release();
    let stale = rig.button.timer().armed_token().unwrap();
    rig.press();

    assert_eq!(rig.core.handle_timeout(stale), None);
    assert_eq!(rig.mode(), Mode::Percussion);
    assert_eq!(
        rig.dispatcher_events(),
        vec![
            AppEvent::GestureRecognized(Gesture::DoublePress),
            AppEvent::SystemActionRequested {
                action: SystemAction::Restart,
                issued: true,
            },
        ]
    );
}

#[test]
fn refused_restart_is_reported_and_machine_stays_usable() {
    let mut rig = Rig::build(RecordingSystem::refusing(), false);

    rig.press();
    rig.release();
    rig.press();

    assert!(rig.dispatcher_events().contains(&AppEvent::SystemActionRequested {
        action: SystemAction::Restart,
        issued: false,
    }));
    assert_eq!(rig.core.state(), GestureState::Idle);

    rig.release();
    rig.press();
    rig.release();
    assert_eq!(rig.fire_timer(), Some(Gesture::SinglePress));
    assert_eq!(rig.mode(), Mode::VolumeInstrument);
}

// ── Long press ────────────────────────────────────────────────

#[test]
fn long_press_requests_shutdown_once() {
    let mut rig = Rig::new();

    rig.press();
    assert_eq!(rig.fire_timer(), Some(Gesture::LongPress));
    assert_eq!(rig.core.state(), GestureState::Idle);

    // Letting go afterwards is not a new gesture.
    rig.release();
    assert_eq!(rig.core.state(), GestureState::Idle);
    assert_eq!(rig.system_calls(), vec![SystemAction::Shutdown]);
    assert_eq!(rig.mode(), Mode::Percussion);
}

#[test]
fn release_before_long_press_window_supersedes_long_press() {
    let mut rig = Rig::new();

    rig.press();
    let long_token = rig.button.timer().armed_token().unwrap();
    rig.release();

    assert_eq!(rig.core.handle_timeout(long_token), None);
    assert_eq!(rig.core.state(), GestureState::Released);
    assert!(rig.system_calls().is_empty());

    assert_eq!(rig.fire_timer(), Some(Gesture::SinglePress));
}

// ── Bottom half ───────────────────────────────────────────────

#[test]
fn debounce_pause_follows_phase_edges_only() {
    let mut rig = Rig::new();

    rig.press();
    rig.release();
    assert_eq!(rig.button_delay().pauses, 2);
    assert_eq!(rig.button_delay().total(), Duration::from_millis(20));

    // The press completing a double press is locked out as well.
    rig.press();
    assert_eq!(rig.button_delay().pauses, 3);

    // Releasing it changes nothing in the machine, so no pause.
    rig.release();
    assert_eq!(rig.button_delay().pauses, 3);
}

#[test]
fn chatter_after_double_press_adds_no_gesture() {
    let mut rig = Rig::build(RecordingSystem::default(), true);

    rig.press();
    rig.release();
    let outcome = rig.press().expect("edge pending");
    assert_eq!(outcome.gesture, Some(Gesture::DoublePress));

    // The contact bounced while the second press was still held.
    assert_eq!(rig.button_delay().pauses, 3);
    assert_eq!(rig.button_delay().chatter_accepted, 0);
    assert!(!rig.latch.is_pending());
    assert_eq!(rig.core.state(), GestureState::Idle);

    rig.release();
    assert_eq!(rig.core.state(), GestureState::Idle);
    assert_eq!(rig.button.timer().calls.last(), Some(&TimerCall::Disarm));

    assert_eq!(rig.system_calls(), vec![SystemAction::Restart]);
    let gestures: Vec<_> = rig
        .dispatcher_events()
        .into_iter()
        .filter(|e| matches!(e, AppEvent::GestureRecognized(_)))
        .collect();
    assert_eq!(gestures, vec![AppEvent::GestureRecognized(Gesture::DoublePress)]);
    assert_eq!(rig.mode(), Mode::Percussion);
}

#[test]
fn contact_chatter_during_lockout_is_rejected() {
    let mut rig = Rig::build(RecordingSystem::default(), true);

    rig.press();

    assert_eq!(rig.button_delay().pauses, 1);
    assert_eq!(rig.button_delay().chatter_accepted, 0);
    assert!(!rig.latch.is_pending());
    assert!(rig.latch.is_gate_open());
    assert_eq!(rig.core.state(), GestureState::Pressed);
}

#[test]
fn coalesced_edges_are_processed_once() {
    let mut rig = Rig::new();
    rig.button.pin_mut().pressed = true;
    for _ in 0..3 {
        assert!(rig.latch.notify_edge());
    }

    assert!(rig.button.poll(&rig.core).is_some());
    assert!(rig.button.poll(&rig.core).is_none());
    assert_eq!(rig.button.pin_mut().reads, 1);
    assert_eq!(rig.core.state(), GestureState::Pressed);
}

#[test]
fn release_while_idle_is_ignored() {
    let mut rig = Rig::new();

    let outcome = rig.release().expect("edge pending");

    assert!(!outcome.is_transition());
    assert!(rig.button.timer().calls.is_empty());
    assert_eq!(rig.button_delay().pauses, 0);
    assert_eq!(rig.core.state(), GestureState::Idle);
}

#[test]
fn unreadable_pin_drops_edge_and_reopens_gate() {
    let mut rig = Rig::new();
    rig.button.pin_mut().fail = true;

    assert!(rig.press().is_none());

    assert!(rig.latch.is_gate_open());
    assert!(rig.button.timer().calls.is_empty());
    assert_eq!(rig.core.state(), GestureState::Idle);
}
