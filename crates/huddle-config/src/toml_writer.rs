//! Write TOML documents to disk.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place so a
//! crash mid-write never leaves a truncated file.

use std::path::Path;

use huddle_common::ConfigError;
use serde::Serialize;

use crate::schema::HuddleConfig;
use crate::toml_loader::default_config_path;

/// Write config to the platform default path.
pub fn save_config(config: &HuddleConfig) -> Result<(), ConfigError> {
    let path = default_config_path()?;
    save_config_to_path(config, &path)
}

pub fn save_config_to_path(config: &HuddleConfig, path: &Path) -> Result<(), ConfigError> {
    write_toml_atomic(config, path)
}

/// Serialize `value` and atomically replace `path` with it.
pub(crate) fn write_toml_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(value)
        .map_err(|e| ConfigError::WriteError(format!("failed to serialize TOML: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::WriteError(format!(
                "failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &toml_str).map_err(|e| {
        ConfigError::WriteError(format!("failed to write {}: {e}", tmp_path.display()))
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Windows refuses to rename over an existing file.
        tracing::warn!("atomic rename failed ({}), falling back to direct write", e);
        std::fs::write(path, &toml_str).map_err(|e2| {
            ConfigError::WriteError(format!("failed to write {}: {e2}", path.display()))
        })?;
        let _ = std::fs::remove_file(&tmp_path);
    }

    tracing::debug!(path = %path.display(), "TOML written to disk");
    Ok(())
}
