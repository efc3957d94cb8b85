//! Controller tuning: poll cadence, stabilization window, capture depths and
//! the fixed render delays between keystrokes.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ControllerError;

/// All durations are in milliseconds except `timeout_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub poll_interval_ms: u64,
    pub stabilization_ms: u64,
    /// Default per-command timeout.
    pub timeout_secs: u64,
    pub poll_capture_lines: u32,
    pub final_capture_lines: u32,
    pub fallback_history_limit: u32,
    pub marker_delay_ms: u64,
    pub end_marker_delay_ms: u64,
    pub clear_delay_ms: u64,
    pub fallback_end_delay_ms: u64,
    /// Lines returned verbatim when nothing in the capture can be anchored.
    pub recent_lines: usize,
    pub interrupt_settle_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            stabilization_ms: 1500,
            timeout_secs: 300,
            poll_capture_lines: 1000,
            final_capture_lines: 50_000,
            fallback_history_limit: 50_000,
            marker_delay_ms: 500,
            end_marker_delay_ms: 800,
            clear_delay_ms: 300,
            fallback_end_delay_ms: 500,
            recent_lines: 50,
            interrupt_settle_ms: 1000,
        }
    }
}

impl ControllerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self, ControllerError> {
        let config: Self =
            toml::from_str(s).map_err(|e| ControllerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.poll_interval_ms == 0 {
            return Err(ControllerError::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.final_capture_lines == 0 {
            return Err(ControllerError::Config(
                "final_capture_lines must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stabilization(&self) -> Duration {
        Duration::from_millis(self.stabilization_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Consecutive unchanged polls needed to cover the stabilization window.
    pub fn required_stable_ticks(&self) -> u32 {
        let interval = self.poll_interval_ms.max(1);
        let ticks = self.stabilization_ms.div_ceil(interval).max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}
