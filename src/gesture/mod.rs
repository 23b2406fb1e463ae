//! Button gesture recognition: single, double and long press.
//!
//! ```text
//!  button ISR ──▶ EdgeLatch ──▶ ButtonBottomHalf::poll ──▶ GestureCore::on_edge ─┐
//!                 (atomics)       (main loop, debounce)       │ arm / disarm       │
//!                                                             ▼                    ▼
//!                                  one-shot timer ──▶ GestureCore::on_timeout ──▶ GestureDispatch
//! ```
//!
//! ## Synchronisation
//!
//! The edge interrupt touches only the [`EdgeLatch`] atomics.  The
//! [`GestureMachine`] is reached from two paths that may run concurrently:
//! the bottom half (main loop) and the timer expiry (timer task or thread).
//! Both go through one critical-section mutex, and the hardware timer is
//! armed or disarmed inside the same critical section as the state change
//! it belongs to.  Dispatch runs after the critical section is released,
//! serialised by its own lock, so it is free to print or spawn processes.

pub mod bottom_half;
pub mod latch;
pub mod machine;

use core::cell::RefCell;
use std::sync::{Mutex as StdMutex, MutexGuard};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use log::{debug, info, warn};

use crate::app::ports::{GestureDispatch, OneShotTimer, TimeoutNotifier};
use crate::config::GestureTimings;

pub use bottom_half::ButtonBottomHalf;
pub use latch::EdgeLatch;
pub use machine::{
    EdgeOutcome, Gesture, GestureMachine, GestureState, Level, PendingAction, TimerCommand,
    TimerToken,
};

/// The shared gesture record plus the dispatcher it drives.
pub struct GestureCore<D> {
    machine: Mutex<CriticalSectionRawMutex, RefCell<GestureMachine>>,
    dispatcher: StdMutex<D>,
}

impl<D: GestureDispatch> GestureCore<D> {
    pub fn new(timings: GestureTimings, dispatcher: D) -> Self {
        info!(
            "gesture: debounce={}ms double={}ms long={}ms",
            timings.debounce_ms, timings.double_press_window_ms, timings.long_press_window_ms
        );
        Self {
            machine: Mutex::new(RefCell::new(GestureMachine::new(timings))),
            dispatcher: StdMutex::new(dispatcher),
        }
    }

    /// Edge path: advance on the level read by the bottom half.
    pub fn on_edge(&self, level: Level, timer: &mut impl OneShotTimer) -> EdgeOutcome {
        let outcome = self.machine.lock(|cell| {
            let mut machine = cell.borrow_mut();
            let outcome = machine.on_edge(level);
            match outcome.timer {
                TimerCommand::Arm { after, token } => timer.arm(after, token),
                TimerCommand::Disarm => timer.disarm(),
                TimerCommand::Leave => {}
            }
            if outcome.is_transition() {
                debug!("gesture: {:?} edge -> {:?}", level, machine.state());
            }
            outcome
        });

        if let Some(gesture) = outcome.gesture {
            self.dispatch(gesture);
        }
        outcome
    }

    /// Timer path: finalise the gesture the expiring arm stood for.
    pub fn handle_timeout(&self, token: TimerToken) -> Option<Gesture> {
        let gesture = self.machine.lock(|cell| cell.borrow_mut().on_timeout(token));
        match gesture {
            Some(g) => self.dispatch(g),
            None => debug!("gesture: stale timer #{} ignored", token.get()),
        }
        gesture
    }

    pub fn state(&self) -> GestureState {
        self.machine.lock(|cell| cell.borrow().state())
    }

    pub fn pending(&self) -> PendingAction {
        self.machine.lock(|cell| cell.borrow().pending())
    }

    /// Run `f` against the dispatcher under its lock.
    pub fn with_dispatcher<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.lock_dispatcher())
    }

    fn dispatch(&self, gesture: Gesture) {
        info!("gesture: {:?}", gesture);
        let mut dispatcher = self.lock_dispatcher();
        match gesture {
            Gesture::SinglePress => dispatcher.rotate_mode(),
            Gesture::DoublePress => dispatcher.request_restart(),
            Gesture::LongPress => dispatcher.request_shutdown(),
        }
    }

    fn lock_dispatcher(&self) -> MutexGuard<'_, D> {
        self.dispatcher.lock().unwrap_or_else(|poisoned| {
            warn!("gesture: dispatcher lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<D: GestureDispatch + Send> TimeoutNotifier for GestureCore<D> {
    fn on_timeout(&self, token: TimerToken) {
        self.handle_timeout(token);
    }
}
