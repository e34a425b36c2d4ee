//! Configuration for the engine host.
//!
//! The engine itself only reads [`ReminderSettings`]; the remaining sections
//! configure the poll loop and display defaults of a host.

use crate::filter::Tab;
use crate::ordering::SortMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Re-notify cadence for fired reminders.
    pub reminder: ReminderSettings,
    /// Host poll loop settings.
    pub poll: PollConfig,
    /// Display defaults.
    pub display: DisplayConfig,
}

/// Re-notify settings read by [`crate::reminder::policy::fire`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    /// Seconds between repeated notifications. `0` disables re-notify.
    pub repeat_interval_sec: i64,
    /// Maximum number of re-notifications. `0` means until completion.
    pub repeat_max_times: u32,
}

impl ReminderSettings {
    /// Re-notify interval with negative values treated as disabled.
    #[must_use]
    pub fn interval(&self) -> i64 {
        self.repeat_interval_sec.max(0)
    }

    /// Whether a reminder that has re-armed `fired_count` times may re-arm again.
    #[must_use]
    pub fn allows_rearm(&self, fired_count: u32) -> bool {
        self.interval() > 0 && (self.repeat_max_times == 0 || fired_count < self.repeat_max_times)
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between reminder evaluations.
    pub tick_interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 30,
        }
    }
}

impl PollConfig {
    /// Tick interval, at least one second.
    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

/// Display defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Sort mode used when the caller does not pick one.
    pub default_sort: SortMode,
    /// Tab shown first.
    pub default_tab: Tab,
}

impl EngineConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::EngineError::Config(e.to_string()))
    }

    /// Load from `path` if it exists, else return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> crate::error::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EngineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_file()
    }
}
