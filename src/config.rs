//! User configuration persisted as JSON under the roaming config directory.

use crate::hotkeys::HotkeyBinding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Application directory name under the user's config dir.
pub const APP_DIR: &str = "HearHere";

const CONFIG_FILE: &str = "config.json";

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ordered endpoint IDs to cycle through (the enabled device list)
    pub enabled_device_ids: Vec<String>,

    /// Hotkey for switching to the next output device
    pub next_device_hotkey: HotkeyBinding,

    /// Hotkey for switching to the previous output device
    pub previous_device_hotkey: HotkeyBinding,

    /// Register in the Windows Run key
    pub start_with_windows: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled_device_ids: Vec::new(),
            next_device_hotkey: HotkeyBinding::new(true, true, false, "F11"),
            previous_device_hotkey: HotkeyBinding::new(true, true, true, "F11"),
            start_with_windows: false,
        }
    }
}

impl AppConfig {
    /// Drop empty and duplicate IDs, keeping the first occurrence.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.enabled_device_ids
            .retain(|id| !id.is_empty() && seen.insert(id.clone()));
    }

    pub fn is_enabled(&self, device_id: &str) -> bool {
        self.enabled_device_ids.iter().any(|id| id == device_id)
    }

    /// Append `device_id` to the cycle, or remove it if already there.
    /// Returns whether the device is enabled afterwards.
    pub fn toggle_enabled(&mut self, device_id: &str) -> bool {
        if let Some(pos) = self
            .enabled_device_ids
            .iter()
            .position(|id| id == device_id)
        {
            self.enabled_device_ids.remove(pos);
            false
        } else {
            self.enabled_device_ids.push(device_id.to_string());
            true
        }
    }
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration directory available")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Loads and saves [`AppConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/HearHere/config.json`.
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(app_data_dir()?.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration. A missing or unreadable file yields defaults.
    pub fn load(&self) -> AppConfig {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No configuration file, using defaults");
                return AppConfig::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read configuration");
                return AppConfig::default();
            }
        };

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(mut config) => {
                config.normalize();
                debug!(
                    path = %self.path.display(),
                    enabled = config.enabled_device_ids.len(),
                    "Configuration loaded"
                );
                config
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to parse configuration");
                AppConfig::default()
            }
        }
    }

    /// Write the configuration, creating the parent directory if needed.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

/// `<config dir>/HearHere`, home of the config file and logs.
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoConfigDir)
}
