use std::path::{Path, PathBuf};

use huddle_common::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schema::{DeviceSettings, ScreenShareSettings};
use crate::toml_loader::default_settings_path;
use crate::toml_writer::write_toml_atomic;

/// The record written to `voice-settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub devices: DeviceSettings,
    pub screen_share: ScreenShareSettings,
}

/// File-backed storage for [`PersistedSettings`].
///
/// Reads never fail: a missing or malformed file yields the defaults.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Store at the platform default location, or memory-only if the
    /// config directory cannot be determined.
    pub fn default_location() -> Self {
        match default_settings_path() {
            Ok(path) => Self::at(path),
            Err(e) => {
                warn!("voice settings will not be persisted: {e}");
                Self::in_memory()
            }
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> PersistedSettings {
        let Some(path) = &self.path else {
            return PersistedSettings::default();
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no voice settings saved yet");
                return PersistedSettings::default();
            }
            Err(e) => {
                warn!(path = %path.display(), "failed to read voice settings, using defaults: {e}");
                return PersistedSettings::default();
            }
        };

        match toml::from_str::<PersistedSettings>(&content) {
            Ok(mut settings) => {
                settings.devices = settings.devices.clamped();
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), "malformed voice settings, using defaults: {e}");
                PersistedSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PersistedSettings) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => write_toml_atomic(settings, path),
            None => Ok(()),
        }
    }
}
