//! System control adapter.
//!
//! - **`target_os = "espidf"`**: restart is a soft reset; shutdown is
//!   deep sleep with every wake source disabled, which only a power
//!   cycle or reset ends.
//! - **`not(target_os = "espidf")`**: runs the configured shell command
//!   in the background (`sh -c '<command> &'`) and reaps the shell, like
//!   a backgrounded `system()`.

use log::info;

use crate::app::ports::{SystemControl, SystemError};

#[cfg(not(target_os = "espidf"))]
use crate::config::CommandLine;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys;

#[cfg(target_os = "espidf")]
#[derive(Default)]
pub struct DeviceSystemControl;

#[cfg(target_os = "espidf")]
impl DeviceSystemControl {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl SystemControl for DeviceSystemControl {
    fn restart(&mut self) -> Result<(), SystemError> {
        info!("system: restarting");
        esp_idf_svc::hal::reset::restart();
    }

    fn shutdown(&mut self) -> Result<(), SystemError> {
        info!("system: entering deep sleep, no wake source");
        // SAFETY: plain SoC calls; esp_deep_sleep_start never returns.
        unsafe {
            sys::esp_sleep_disable_wakeup_source(sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_ALL);
            sys::esp_deep_sleep_start()
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct DeviceSystemControl {
    restart_command: CommandLine,
    shutdown_command: CommandLine,
}

#[cfg(not(target_os = "espidf"))]
impl DeviceSystemControl {
    pub fn new(restart_command: CommandLine, shutdown_command: CommandLine) -> Self {
        Self {
            restart_command,
            shutdown_command,
        }
    }

    /// The outer shell exits as soon as the command is backgrounded, so
    /// waiting on it returns at once and leaves no zombie behind.
    fn spawn(command: &str) -> Result<(), SystemError> {
        info!("system: running '{}'", command);
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("{} &", command))
            .status()
            .map_err(|e| {
                log::warn!("system: '{}' could not be started: {}", command, e);
                SystemError::SpawnFailed
            })?;
        if status.success() {
            Ok(())
        } else {
            log::warn!("system: '{}' was not backgrounded ({})", command, status);
            Err(SystemError::SpawnFailed)
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl SystemControl for DeviceSystemControl {
    fn restart(&mut self) -> Result<(), SystemError> {
        Self::spawn(&self.restart_command)
    }

    fn shutdown(&mut self) -> Result<(), SystemError> {
        Self::spawn(&self.shutdown_command)
    }
}
