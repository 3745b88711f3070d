//! Reaper configuration.
//!
//! ```toml
//! enabled = true
//! retention_days = 2
//! interval_secs = 86400
//! include_deleted_schedules = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::RetentionWindow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaperConfig {
    /// Whether the periodic loop runs at all.
    pub enabled: bool,
    /// Days a record is kept after its scheduled end time.
    pub retention_days: u32,
    /// Seconds between sweeps.
    pub interval_secs: u64,
    /// Also sweep schedules the user already deleted.
    pub include_deleted_schedules: bool,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: RetentionWindow::DEFAULT_DAYS,
            interval_secs: 24 * 60 * 60,
            include_deleted_schedules: true,
        }
    }
}

impl ReaperConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.retention_days > RetentionWindow::MAX_DAYS {
            return Err(ConfigError::Invalid(format!(
                "retention_days must be at most {}",
                RetentionWindow::MAX_DAYS
            )));
        }
        Ok(())
    }

    pub fn retention(&self) -> RetentionWindow {
        RetentionWindow::days(self.retention_days)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
