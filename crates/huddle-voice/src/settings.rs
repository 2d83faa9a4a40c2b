//! Device and screen-share preferences.
//!
//! Every setter persists immediately. Applying a change to a live session
//! (transport input device, renderer output) is the coordinator's job.

use huddle_config::{DeviceSettings, PersistedSettings, ScreenShareSettings, SettingsStore};
use tracing::{debug, warn};

use crate::transport::ScreenShareConstraints;

pub struct DeviceSettingsManager {
    store: SettingsStore,
    settings: PersistedSettings,
}

impl DeviceSettingsManager {
    /// Load from `store`, falling back to defaults if nothing usable is saved.
    pub fn load(store: SettingsStore) -> Self {
        let settings = store.load();
        debug!(?settings, "voice settings loaded");
        Self { store, settings }
    }

    pub fn devices(&self) -> &DeviceSettings {
        &self.settings.devices
    }

    pub fn screen_share(&self) -> ScreenShareSettings {
        self.settings.screen_share
    }

    /// Constraints for the next screen share.
    pub fn screen_share_constraints(&self) -> ScreenShareConstraints {
        self.settings.screen_share.into()
    }

    pub fn set_input_device(&mut self, device_id: &str) {
        self.settings.devices.input_device_id = device_id.to_string();
        self.persist();
    }

    pub fn set_output_device(&mut self, device_id: &str) {
        self.settings.devices.output_device_id = device_id.to_string();
        self.persist();
    }

    /// Returns the stored (clamped) volume.
    pub fn set_input_volume(&mut self, volume: u8) -> u8 {
        self.settings.devices.input_volume = volume.min(100);
        self.persist();
        self.settings.devices.input_volume
    }

    pub fn set_output_volume(&mut self, volume: u8) -> u8 {
        self.settings.devices.output_volume = volume.min(100);
        self.persist();
        self.settings.devices.output_volume
    }

    /// Takes effect the next time sharing starts.
    pub fn set_screen_share_settings(&mut self, settings: ScreenShareSettings) {
        self.settings.screen_share = settings;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("failed to persist voice settings: {e}");
        }
    }
}
