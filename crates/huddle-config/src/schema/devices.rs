//! Audio device preferences.

use serde::{Deserialize, Serialize};

/// Device id meaning "let the platform pick".
pub const DEFAULT_DEVICE: &str = "default";

/// Input/output device selection and volumes (0-100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub input_device_id: String,
    pub output_device_id: String,
    pub input_volume: u8,
    pub output_volume: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            input_device_id: DEFAULT_DEVICE.into(),
            output_device_id: DEFAULT_DEVICE.into(),
            input_volume: 100,
            output_volume: 100,
        }
    }
}

impl DeviceSettings {
    /// `None` when the platform default device is selected.
    pub fn input_device(&self) -> Option<&str> {
        explicit_device(&self.input_device_id)
    }

    pub fn output_device(&self) -> Option<&str> {
        explicit_device(&self.output_device_id)
    }

    /// Clamp volumes into 0-100.
    pub fn clamped(mut self) -> Self {
        self.input_volume = self.input_volume.min(100);
        self.output_volume = self.output_volume.min(100);
        self
    }
}

fn explicit_device(id: &str) -> Option<&str> {
    if id.is_empty() || id == DEFAULT_DEVICE {
        None
    } else {
        Some(id)
    }
}
