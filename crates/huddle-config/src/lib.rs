//! Huddle configuration.
//!
//! Two TOML files live in the platform config directory:
//!
//! - `config.toml`: application tunables ([`HuddleConfig`]), created with a
//!   commented template on first run.
//! - `voice-settings.toml`: the user's persisted device and screen-share
//!   preferences ([`PersistedSettings`]), rewritten on every change.
//!
//! Every section uses `serde(default)`, so partial files work.

pub mod schema;
pub mod settings;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{
    DeviceSettings, FrameRate, HuddleConfig, LoggingConfig, MicrophoneConfig, Resolution,
    ScreenShareSettings, VoiceConfig, CONFIG_SCHEMA_VERSION,
};
pub use settings::{PersistedSettings, SettingsStore};
pub use toml_writer::{save_config, save_config_to_path};

use huddle_common::ConfigError;

/// Load `config.toml` from the platform default path.
///
/// Creates the file from the template if it is missing. A config that
/// parses but fails validation is replaced by the defaults.
pub fn load_config() -> Result<HuddleConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    if let Err(e) = validation::validate(&config) {
        tracing::warn!("invalid config, using defaults: {e}");
        return Ok(HuddleConfig::default());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validation::validate(&HuddleConfig::default()).is_ok());
    }
}
