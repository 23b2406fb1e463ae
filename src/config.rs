//! System configuration parameters
//!
//! All tunable parameters for the TouchSynth controller.  Defaults match
//! the shipped hardware; a JSON override document can replace any subset
//! of fields (see [`SystemConfig::from_json`]).

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::synth::{Mode, ELECTRODE_COUNT};

/// Capacity of the shell command strings used by the host system adapter.
pub const COMMAND_CAPACITY: usize = 64;

/// Shell command line for the host system adapter.
pub type CommandLine = heapless::String<COMMAND_CAPACITY>;

// ---------------------------------------------------------------------------
// Gesture timing
// ---------------------------------------------------------------------------

/// The three timing windows the button gesture recognizer depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureTimings {
    /// Soft-gate lockout after an accepted edge (switch chatter absorption).
    pub debounce_ms: u32,
    /// Confirmation window after a release: a second press inside it is a
    /// double press, silence until it elapses is a single press.
    pub double_press_window_ms: u32,
    /// Hold duration after which a press is a long press.
    pub long_press_window_ms: u32,
}

impl Default for GestureTimings {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            double_press_window_ms: 300,
            long_press_window_ms: 750,
        }
    }
}

impl GestureTimings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_ms))
    }

    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.double_press_window_ms))
    }

    pub fn long_press_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.long_press_window_ms))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_ms must be non-zero"));
        }
        if self.double_press_window_ms == 0 || self.long_press_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("gesture windows must be non-zero"));
        }
        if self.debounce_ms >= self.double_press_window_ms
            || self.debounce_ms >= self.long_press_window_ms
        {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must be shorter than both gesture windows",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Synth mapping
// ---------------------------------------------------------------------------

/// Touch-to-synth mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Pressure span (baseline - filtered) mapped onto the velocity range.
    /// Larger means less sensitive.
    pub pressure_limit: u16,
    /// Electrode whose pressure drives expression in VolumeInstrument mode.
    pub expression_electrode: u8,
    /// Electrodes that toggle the sustained note in VolumeInstrument mode.
    pub toggle_electrodes: [u8; 2],
    /// Filtered reading below which a percussion pad counts as struck.
    pub percussion_threshold: u16,
    /// Per-electrode refractory period in VolumeInstrument mode.
    pub volume_update_delay_ms: u32,
    /// Per-electrode refractory period in Percussion mode.
    pub percussion_update_delay_ms: u32,
    /// Program selected on the instrument channel when entering VolumeInstrument.
    pub instrument_program: u8,
    /// Mode entered at start-up.
    pub initial_mode: Mode,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            pressure_limit: 150,
            expression_electrode: 11,
            toggle_electrodes: [0, 3],
            percussion_threshold: 500,
            volume_update_delay_ms: 50,
            percussion_update_delay_ms: 100,
            instrument_program: 50,
            initial_mode: Mode::Percussion,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pressure_limit == 0 {
            return Err(ConfigError::ValidationFailed("pressure_limit must be non-zero"));
        }
        let electrodes = [
            self.expression_electrode,
            self.toggle_electrodes[0],
            self.toggle_electrodes[1],
        ];
        if electrodes.iter().any(|&e| usize::from(e) >= ELECTRODE_COUNT) {
            return Err(ConfigError::ValidationFailed("electrode index out of range"));
        }
        if self.instrument_program > 127 {
            return Err(ConfigError::ValidationFailed("instrument_program must be 0-127"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Touch controller
// ---------------------------------------------------------------------------

/// MPR121 bus address and detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub i2c_address: u8,
    /// Touch threshold; low values behave more like a proximity trigger.
    pub touch_threshold: u8,
    /// Release threshold; must stay below the touch threshold.
    pub release_threshold: u8,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x5C,
            touch_threshold: 40,
            release_threshold: 20,
        }
    }
}

impl TouchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0x5A..=0x5D).contains(&self.i2c_address) {
            return Err(ConfigError::ValidationFailed("i2c_address must be 0x5A-0x5D"));
        }
        if self.release_threshold >= self.touch_threshold {
            return Err(ConfigError::ValidationFailed(
                "release_threshold must be below touch_threshold",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub gesture: GestureTimings,
    pub synth: SynthConfig,
    pub touch: TouchConfig,

    // --- Timing ---
    /// Main loop sleep per iteration.  Bounds the latency between a raw
    /// edge and the bottom half observing it.
    pub poll_interval_ms: u32,
    /// Pause before the first synth command so the synth can come up.
    pub startup_delay_ms: u32,

    // --- System actions (host adapter) ---
    pub restart_command: CommandLine,
    pub shutdown_command: CommandLine,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            gesture: GestureTimings::default(),
            synth: SynthConfig::default(),
            touch: TouchConfig::default(),
            poll_interval_ms: 10,
            startup_delay_ms: 2000,
            restart_command: command_line("sync && reboot now"),
            shutdown_command: command_line("sync && halt"),
        }
    }
}

impl SystemConfig {
    /// Parse a JSON override document and validate the result.
    /// Fields missing from the document keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        self.synth.validate()?;
        self.touch.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be non-zero"));
        }
        // Edge-to-bottom-half latency must stay well inside the gesture windows.
        if self.poll_interval_ms.saturating_mul(2) > self.gesture.double_press_window_ms
            || self.poll_interval_ms >= self.gesture.long_press_window_ms
        {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms too long for the gesture windows",
            ));
        }
        if self.restart_command.trim().is_empty() || self.shutdown_command.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("system commands must not be empty"));
        }
        Ok(())
    }
}

fn command_line(s: &str) -> CommandLine {
    let mut line = CommandLine::new();
    // Defaults are well under capacity.
    let _ = line.push_str(s);
    line
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration parsing and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for [`SystemConfig`].
    Parse,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config document could not be parsed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
