//! One-shot gesture timers.
//!
//! Both implementations of
//! [`OneShotTimer`](crate::app::ports::OneShotTimer) keep the current arm
//! in a small slot: `(token, deadline)`.  Expiry consumes the slot only when
//! the deadline has passed and then hands the token to the
//! [`TimeoutNotifier`] with no lock held.  A disarm or re-arm that lands
//! before that point replaces the slot, so the superseded expiry delivers
//! nothing.  One that lands after it is caught by the gesture machine's
//! token check.
//!
//! - **`target_os = "espidf"`**: [`EspOneShotTimer`], one `esp_timer`
//!   dispatched from the ESP timer task (not ISR).
//! - **`not(target_os = "espidf")`**: [`ThreadOneShotTimer`], one sleeper
//!   thread per arm.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::ports::TimeoutNotifier;
use crate::gesture::TimerToken;

#[derive(Clone, Copy)]
struct Pending<T> {
    token: TimerToken,
    deadline: T,
}

/// Timer state shared with the expiry path.
struct ArmSlot<T> {
    notifier: Arc<dyn TimeoutNotifier>,
    pending: Mutex<Option<Pending<T>>>,
}

impl<T: Copy + PartialOrd> ArmSlot<T> {
    fn new(notifier: Arc<dyn TimeoutNotifier>) -> Self {
        Self {
            notifier,
            pending: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pending<T>>> {
        // Plain data; a panicking holder cannot leave it half-written.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, pending: Option<Pending<T>>) {
        *self.lock() = pending;
    }

    /// Consume the arm if it is due and still current, then notify.
    fn expire(&self, now: T, expected: Option<TimerToken>) {
        let due = {
            let mut slot = self.lock();
            match *slot {
                Some(p) if now >= p.deadline && expected.is_none_or(|t| t == p.token) => {
                    *slot = None;
                    Some(p.token)
                }
                _ => None,
            }
        };
        if let Some(token) = due {
            self.notifier.on_timeout(token);
        }
    }
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspOneShotTimer;

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;
    use std::sync::Arc;

    use esp_idf_svc::sys::*;
    use log::{error, info};

    use super::{ArmSlot, Pending};
    use crate::app::ports::{OneShotTimer, TimeoutNotifier};
    use crate::error::Error;
    use crate::gesture::TimerToken;

    fn now_us() -> i64 {
        // SAFETY: esp_timer_get_time reads a free-running counter.
        unsafe { esp_timer_get_time() }
    }

    unsafe extern "C" fn expiry_cb(arg: *mut core::ffi::c_void) {
        // SAFETY: `arg` is the `ArmSlot` leaked in `new()`; it is freed in
        // `drop()` only after `esp_timer_delete`, so no callback outlives it.
        let slot = unsafe { &*arg.cast::<ArmSlot<i64>>() };
        // A callback queued by a stopped arm may still run after a re-arm;
        // the deadline check keeps it from consuming the new one early.
        slot.expire(now_us(), None);
    }

    /// The gesture timer on the device.
    pub struct EspOneShotTimer {
        handle: esp_timer_handle_t,
        slot: *mut ArmSlot<i64>,
    }

    // SAFETY: the handle is only used through thread-safe esp_timer calls and
    // the slot is `Sync`.
    unsafe impl Send for EspOneShotTimer {}

    impl EspOneShotTimer {
        pub fn new(notifier: Arc<dyn TimeoutNotifier>) -> Result<Self, Error> {
            let slot = Box::into_raw(Box::new(ArmSlot::new(notifier)));
            let args = esp_timer_create_args_t {
                callback: Some(expiry_cb),
                arg: slot.cast(),
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: c"gesture".as_ptr(),
                skip_unhandled_events: false,
            };
            let mut handle: esp_timer_handle_t = core::ptr::null_mut();
            // SAFETY: `args` and `handle` are valid for the call; the timer
            // does not start until armed.
            let ret = unsafe { esp_timer_create(&args, &mut handle) };
            if ret != ESP_OK {
                // SAFETY: the timer was never created, nothing else holds `slot`.
                drop(unsafe { Box::from_raw(slot) });
                return Err(Error::Timer(ret));
            }
            info!("one_shot: gesture timer created");
            Ok(Self { handle, slot })
        }

        fn slot(&self) -> &ArmSlot<i64> {
            // SAFETY: valid from `new()` until `drop()`.
            unsafe { &*self.slot }
        }

        fn stop(&self) {
            // ESP_ERR_INVALID_STATE just means it was not running.
            // SAFETY: `handle` is a live timer.
            unsafe { esp_timer_stop(self.handle) };
        }
    }

    impl OneShotTimer for EspOneShotTimer {
        fn arm(&mut self, after: Duration, token: TimerToken) {
            self.stop();
            let after_us = after.as_micros().min(u128::from(u64::MAX >> 1)) as u64;
            self.slot().set(Some(Pending {
                token,
                deadline: now_us() + after_us as i64,
            }));
            // SAFETY: `handle` is a live, stopped timer.
            let ret = unsafe { esp_timer_start_once(self.handle, after_us) };
            if ret != ESP_OK {
                error!("one_shot: start failed (rc={}), gesture timeout lost", ret);
                self.slot().set(None);
            }
        }

        fn disarm(&mut self) {
            self.slot().set(None);
            self.stop();
        }
    }

    impl Drop for EspOneShotTimer {
        fn drop(&mut self) {
            // SAFETY: stop + delete leave no pending callbacks, after which
            // the slot has no other owner.
            unsafe {
                esp_timer_stop(self.handle);
                esp_timer_delete(self.handle);
                drop(Box::from_raw(self.slot));
            }
        }
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::ThreadOneShotTimer;

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::time::Duration;
    use std::sync::Arc;
    use std::time::Instant;

    use super::{ArmSlot, Pending};
    use crate::app::ports::{OneShotTimer, TimeoutNotifier};
    use crate::gesture::TimerToken;

    /// Host stand-in for the gesture timer: every arm spawns a sleeper
    /// thread that fires only if its arm is still the current one.
    pub struct ThreadOneShotTimer {
        slot: Arc<ArmSlot<Instant>>,
    }

    impl ThreadOneShotTimer {
        pub fn new(notifier: Arc<dyn TimeoutNotifier>) -> Self {
            Self {
                slot: Arc::new(ArmSlot::new(notifier)),
            }
        }

        /// Token of the outstanding arm, if any.
        pub fn pending_token(&self) -> Option<TimerToken> {
            (*self.slot.lock()).map(|p| p.token)
        }
    }

    impl OneShotTimer for ThreadOneShotTimer {
        fn arm(&mut self, after: Duration, token: TimerToken) {
            let deadline = Instant::now() + after;
            self.slot.set(Some(Pending { token, deadline }));

            let slot = Arc::clone(&self.slot);
            let spawned = std::thread::Builder::new()
                .name("gesture-timer".into())
                .spawn(move || {
                    std::thread::sleep(after);
                    slot.expire(Instant::now(), Some(token));
                });
            if let Err(e) = spawned {
                log::error!("one_shot(sim): timer thread failed to start: {}", e);
                self.slot.set(None);
            }
        }

        fn disarm(&mut self) {
            self.slot.set(None);
        }
    }

    impl Drop for ThreadOneShotTimer {
        fn drop(&mut self) {
            self.disarm();
        }
    }
}
