//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Data (cache db, logs) | `~/Library/Application Support/techsearch/` | `~/.local/share/techsearch/` |
//! | Config | `~/Library/Application Support/techsearch/` | `~/.config/techsearch/` |
//!
//! # Environment Overrides
//!
//! - `TECHSEARCH_DATA_DIR` overrides [`data_dir`]
//! - `TECHSEARCH_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

const APP_DIR_NAME: &str = "techsearch";

/// Application data root.
///
/// Resolves to `dirs::data_dir()/techsearch/` by default.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("TECHSEARCH_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("techsearch-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/techsearch/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("TECHSEARCH_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("techsearch-config"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default cache database path (`data_dir()/cache.db`).
#[must_use]
pub fn cache_db_file() -> PathBuf {
    data_dir().join(crate::cache::DB_FILENAME)
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
