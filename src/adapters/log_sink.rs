//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on the device, stderr or nothing on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a single line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            AppEvent::GestureRecognized(gesture) => {
                info!("GESTURE | {:?}", gesture);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::SoundToggled(on) => {
                info!("SOUND | {}", if *on { "on" } else { "off" });
            }
            AppEvent::SystemActionRequested { action, issued: true } => {
                info!("SYSTEM | {:?} issued", action);
            }
            AppEvent::SystemActionRequested { action, issued: false } => {
                warn!("SYSTEM | {:?} failed", action);
            }
        }
    }
}
