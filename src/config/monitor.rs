//! Periodic monitor configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::MonitorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between monitor ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Append-only file receiving one line per tick
    #[serde(default = "default_activity_log_path")]
    pub activity_log_path: PathBuf,
}

impl MonitoringConfig {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.interval_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::MustBePositive("monitor.interval_secs"));
        }
        if self.activity_log_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("monitor.activity_log_path"));
        }
        Ok(())
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            activity_log_path: default_activity_log_path(),
        }
    }
}

fn default_interval_secs() -> u64 {
    30
}

fn default_activity_log_path() -> PathBuf {
    PathBuf::from("data/activity.log")
}
