//! Gesture actions: what each recognised gesture does.
//!
//! | Gesture      | Action                                   |
//! |--------------|------------------------------------------|
//! | Single press | Rotate the synth mode (silences first)   |
//! | Double press | Restart request via [`SystemControl`]    |
//! | Long press   | Shutdown request via [`SystemControl`]   |
//!
//! System actions are fire-and-forget: a failure is logged and reported
//! as an event, never fed back into the gesture state machine.

use std::sync::{Arc, Mutex};

use log::warn;

use crate::gesture::Gesture;

use super::events::{AppEvent, SystemAction};
use super::ports::{EventSink, GestureDispatch, IndicatorPort, SynthSink, SystemControl};
use super::service::SynthService;

/// Synth service shared between the main loop and the gesture dispatcher.
pub type SharedService<S, I, E> = Arc<Mutex<SynthService<S, I, E>>>;

pub struct GestureActions<S, I, E, X, G> {
    service: SharedService<S, I, E>,
    system: X,
    events: G,
}

impl<S, I, E, X, G> GestureActions<S, I, E, X, G>
where
    S: SynthSink,
    I: IndicatorPort,
    E: EventSink,
    X: SystemControl,
    G: EventSink,
{
    pub fn new(service: SharedService<S, I, E>, system: X, events: G) -> Self {
        Self {
            service,
            system,
            events,
        }
    }

    pub fn system(&self) -> &X {
        &self.system
    }

    pub fn events(&self) -> &G {
        &self.events
    }

    fn run_system_action(&mut self, action: SystemAction) {
        let result = match action {
            SystemAction::Restart => self.system.restart(),
            SystemAction::Shutdown => self.system.shutdown(),
        };
        if let Err(e) = &result {
            warn!("gesture: {:?} not issued: {}", action, e);
        }
        self.events.emit(&AppEvent::SystemActionRequested {
            action,
            issued: result.is_ok(),
        });
    }
}

impl<S, I, E, X, G> GestureDispatch for GestureActions<S, I, E, X, G>
where
    S: SynthSink,
    I: IndicatorPort,
    E: EventSink,
    X: SystemControl,
    G: EventSink,
{
    fn rotate_mode(&mut self) {
        self.events.emit(&AppEvent::GestureRecognized(Gesture::SinglePress));
        let mut service = self.service.lock().unwrap_or_else(|poisoned| {
            warn!("gesture: synth service lock poisoned, recovering");
            poisoned.into_inner()
        });
        service.rotate_mode();
    }

    fn request_restart(&mut self) {
        self.events.emit(&AppEvent::GestureRecognized(Gesture::DoublePress));
        self.run_system_action(SystemAction::Restart);
    }

    fn request_shutdown(&mut self) {
        self.events.emit(&AppEvent::GestureRecognized(Gesture::LongPress));
        self.run_system_action(SystemAction::Shutdown);
    }
}
