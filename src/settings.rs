//! Persisted settings store.
//!
//! Three values survive restarts: the flat cache rows, the last selected
//! country code, and the refresh interval. They are stored together at
//! `~/.config/covidtrack/settings.json`, with key names kept from the
//! original settings schema.
//!
//! The store is read once at startup and written once at shutdown; there
//! is no intermediate persistence, so data loss on crash is accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CacheRow, WORLD_CODE};

/// Application name used for the config directory path
const APP_NAME: &str = "covidtrack";

/// Settings file name
const SETTINGS_FILE: &str = "settings.json";

/// Default refresh interval when no settings file exists yet.
const DEFAULT_UPDATE_FREQUENCY_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// No usable config directory; there is no store to operate on, so
    /// this aborts initialization.
    #[error("could not locate a configuration directory for the settings store")]
    StoreUnavailable,

    #[error("failed to access settings store: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Flat cache rows in the fixed column order.
    pub cache: Vec<CacheRow>,
    #[serde(rename = "selected-country")]
    pub selected_country: String,
    /// Refresh interval in seconds.
    #[serde(rename = "update-frequency")]
    pub update_frequency: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache: Vec::new(),
            selected_country: WORLD_CODE.to_string(),
            update_frequency: DEFAULT_UPDATE_FREQUENCY_SECS,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::settings_path()?)
    }

    /// Load from an explicit path. A missing file yields the defaults
    /// (the schema ships defaults); an unreadable or unparseable file is
    /// fatal, since a half-read store could corrupt the cache.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn settings_path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::StoreUnavailable)?;
        Ok(config_dir.join(APP_NAME).join(SETTINGS_FILE))
    }
}
