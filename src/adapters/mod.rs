//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                         |
//! |------------|----------------|-------------------------------------|
//! | `console`  | SynthSink      | stdout / console UART               |
//! | `log_sink` | EventSink      | Serial log output                   |
//! | `system`   | SystemControl  | `esp_restart` / deep sleep, or `sh` |
//!
//! Hardware-facing port implementations (timer, touch controller,
//! status LED, button pin) live in [`crate::drivers`].

pub mod console;
pub mod log_sink;
pub mod system;
