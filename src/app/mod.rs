//! Application core: pure domain logic, zero I/O.
//!
//! The synth service (touch mapping and mode rotation) and the gesture
//! actions that drive it.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;
