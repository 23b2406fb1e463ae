//! Raw edge flag and soft gate, shared with the button interrupt.
//!
//! The interrupt handler's only job is [`EdgeLatch::notify_edge`]: two
//! atomic operations, no locks, safe in ISR context.  The flag coalesces:
//! any number of edges before the bottom half runs collapse into one
//! pending notification, and the bottom half reads the current level.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct EdgeLatch {
    raw_edge: AtomicBool,
    gate_open: AtomicBool,
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            raw_edge: AtomicBool::new(false),
            gate_open: AtomicBool::new(true),
        }
    }

    /// Record an edge.  Dropped (returns `false`) while the gate is closed.
    pub fn notify_edge(&self) -> bool {
        if !self.gate_open.load(Ordering::Acquire) {
            return false;
        }
        self.raw_edge.store(true, Ordering::Release);
        true
    }

    /// Consume the pending edge, if any.
    pub fn take(&self) -> bool {
        self.raw_edge.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.raw_edge.load(Ordering::Acquire)
    }

    pub fn close_gate(&self) {
        self.gate_open.store(false, Ordering::Release);
    }

    pub fn open_gate(&self) {
        self.gate_open.store(true, Ordering::Release);
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open.load(Ordering::Acquire)
    }
}
