//! Filesystem locations used by the host.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Data | `~/Library/Application Support/mustdo/` | `~/.local/share/mustdo/` |
//! | Config | `~/Library/Application Support/mustdo/` | `~/.config/mustdo/` |
//!
//! Override with `MUSTDO_DATA_DIR` and `MUSTDO_CONFIG_DIR`.

use std::path::PathBuf;

/// Application data root directory.
///
/// Resolves to `dirs::data_dir()/mustdo/` by default.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MUSTDO_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("mustdo"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mustdo-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/mustdo/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MUSTDO_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("mustdo"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mustdo-config"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Task list path (`data_dir()/tasks.json`).
#[must_use]
pub fn tasks_file() -> PathBuf {
    data_dir().join("tasks.json")
}
