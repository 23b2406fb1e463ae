//! TouchSynth firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod gesture;
pub mod pins;
pub mod synth;

// Hardware-facing modules; the device implementations are guarded by cfg
// attributes inside, with host simulations alongside.
pub mod adapters;
pub mod drivers;

mod esp_link_shims;
