//! User-facing controls: mute, deafen, push-to-talk, camera, screen
//! sharing and devices.

use std::sync::Arc;

use huddle_common::{Notification, VoiceError};
use huddle_config::{DeviceSettings, ScreenShareSettings};
use tracing::{debug, error, info, warn};

use super::coordinator::{SessionState, VoiceCoordinator};
use super::types::VoiceEvent;
use crate::participants::ParticipantUpdate;
use crate::transport::{TransportError, TransportHandle};

impl VoiceCoordinator {
    /// Flip mute. Refused while deafened. Returns the new `muted` value.
    pub fn toggle_mute(&self) -> Result<bool, VoiceError> {
        let result = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let transport = state.transport.clone();
            let result = state.mute.toggle_mute(transport.as_deref());
            if let Ok(muted) = result {
                sync_local_audio(state, muted);
            }
            result
        };

        match result {
            Ok(muted) => {
                debug!(muted, "mute toggled");
                self.emit(VoiceEvent::MuteChanged { muted });
                self.publish_voice_state();
                Ok(muted)
            }
            Err(e) => {
                self.notify(Notification::warning(format!("Cannot unmute: {e}")));
                Err(e)
            }
        }
    }

    /// Flip deafen. Deafening mutes and stops all remote playback;
    /// undeafening restores the earlier mute state. Returns the new value.
    pub fn toggle_deafen(&self) -> bool {
        let (deafened, muted) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let transport = state.transport.clone();
            let remotes = state.registry.remote_ids();
            let deafened = state.mute.toggle_deafen(transport.as_deref(), &remotes);
            let muted = state.mute.state().muted;
            sync_local_audio(state, muted);
            (deafened, muted)
        };

        self.inner.services.renderer.set_muted(deafened);
        debug!(deafened, muted, "deafen toggled");
        self.emit(VoiceEvent::DeafenChanged { deafened });
        self.emit(VoiceEvent::MuteChanged { muted });
        self.notify(Notification::info(if deafened { "Deafened" } else { "Undeafened" }));
        self.publish_voice_state();
        deafened
    }

    /// Open the microphone while the push-to-talk key is held.
    pub fn push_to_talk_start(&self) -> bool {
        self.push_to_talk(true)
    }

    pub fn push_to_talk_end(&self) -> bool {
        self.push_to_talk(false)
    }

    fn push_to_talk(&self, pressed: bool) -> bool {
        let (changed, before, muted) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let transport = state.transport.clone();
            let before = state.mute.state().muted;
            let changed = if pressed {
                state.mute.push_to_talk_start(transport.as_deref())
            } else {
                state.mute.push_to_talk_end(transport.as_deref())
            };
            let muted = state.mute.state().muted;
            if changed {
                sync_local_audio(state, muted);
            }
            (changed, before, muted)
        };

        if changed && before != muted {
            self.emit(VoiceEvent::MuteChanged { muted });
        }
        changed
    }

    /// Flip the camera. Returns the new state.
    pub async fn toggle_video(&self) -> Result<bool, VoiceError> {
        let (transport, enabled) = {
            let state = self.lock();
            (connected_transport(&state)?, !state.video_enabled)
        };

        if let Err(e) = transport.set_local_video_enabled(enabled).await {
            error!(enabled, "failed to toggle camera: {e}");
            self.notify(Notification::error("Failed to toggle camera"));
            return Err(VoiceError::Video(e.to_string()));
        }

        {
            let mut state = self.lock();
            state.video_enabled = enabled;
            if let Some(id) = state.registry.local().map(|p| p.id.clone()) {
                state.registry.merge(&ParticipantUpdate::new(id).video(enabled));
            }
        }
        self.emit(VoiceEvent::VideoChanged { enabled });
        self.notify(Notification::info(if enabled { "Camera on" } else { "Camera off" }));
        Ok(enabled)
    }

    /// Start or stop sharing the screen with the saved quality settings.
    /// Returns whether this client is now sharing.
    pub async fn toggle_screen_share(&self) -> Result<bool, VoiceError> {
        let (transport, sharing) = {
            let state = self.lock();
            (
                connected_transport(&state)?,
                state.screen_share.is_local_sharing,
            )
        };
        let (settings, constraints) = {
            let saved = self.settings();
            (saved.screen_share(), saved.screen_share_constraints())
        };

        let result = if sharing {
            transport.stop_screen_share().await
        } else {
            transport.start_screen_share(constraints).await
        };

        if let Err(e) = result {
            self.set_local_sharing(false);
            error!(starting = !sharing, "screen share failed: {e}");
            let message = match e {
                TransportError::PermissionDenied(_) => "Screen sharing permission denied",
                _ => "Failed to share screen",
            };
            self.notify(Notification::error(message));
            return Err(VoiceError::ScreenShare(e.to_string()));
        }

        self.set_local_sharing(!sharing);
        if sharing {
            info!("stopped screen sharing");
            self.notify(Notification::info("Stopped screen sharing"));
        } else {
            info!(resolution = %settings.resolution, fps = %settings.fps, "started screen sharing");
            self.notify(Notification::info(format!(
                "Screen sharing: {} @ {}",
                settings.resolution, settings.fps
            )));
        }
        Ok(!sharing)
    }

    fn set_local_sharing(&self, sharing: bool) {
        let screen_share = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let local_id = state.registry.local().map(|p| p.id.clone());
            if let Some(id) = &local_id {
                state
                    .registry
                    .merge(&ParticipantUpdate::new(id.clone()).screen_sharing(sharing));
            }
            let before = state.screen_share.clone();
            if sharing {
                state.screen_share.started_locally(local_id.as_ref());
            } else {
                state
                    .screen_share
                    .stopped_locally(local_id.as_ref(), &state.registry);
            }
            (state.screen_share != before).then(|| state.screen_share.clone())
        };
        if let Some(screen_share) = screen_share {
            self.emit(VoiceEvent::ScreenShareChanged(screen_share));
        }
    }

    /// Takes effect the next time sharing starts.
    pub fn set_screen_share_settings(&self, settings: ScreenShareSettings) {
        self.settings().set_screen_share_settings(settings);
    }

    pub fn screen_share_settings(&self) -> ScreenShareSettings {
        self.settings().screen_share()
    }

    pub fn device_settings(&self) -> DeviceSettings {
        self.settings().devices().clone()
    }

    /// Save the input device and switch the live transport to it.
    pub async fn set_input_device(&self, device_id: &str) {
        let device = {
            let mut saved = self.settings();
            saved.set_input_device(device_id);
            saved.devices().input_device().map(str::to_owned)
        };
        let transport = live_transport(&self.lock());
        let Some(transport) = transport else {
            return;
        };
        if let Err(e) = transport.set_input_device(device.as_deref()).await {
            warn!(device_id, "failed to switch input device: {e}");
        }
    }

    pub fn set_output_device(&self, device_id: &str) {
        let device = {
            let mut saved = self.settings();
            saved.set_output_device(device_id);
            saved.devices().output_device().map(str::to_owned)
        };
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self
            .inner
            .services
            .renderer
            .set_output_device(device.as_deref())
        {
            warn!(device_id, "failed to switch output device: {e}");
        }
    }

    /// Returns the stored volume, clamped to 0..=100.
    pub fn set_input_volume(&self, volume: u8) -> u8 {
        self.settings().set_input_volume(volume)
    }

    /// Returns the stored volume, clamped to 0..=100.
    pub fn set_output_volume(&self, volume: u8) -> u8 {
        let volume = self.settings().set_output_volume(volume);
        if self.is_connected() {
            self.inner.services.renderer.set_output_volume(volume);
        }
        volume
    }
}

fn connected_transport(state: &SessionState) -> Result<Arc<dyn TransportHandle>, VoiceError> {
    live_transport(state).ok_or(VoiceError::NotConnected)
}

fn live_transport(state: &SessionState) -> Option<Arc<dyn TransportHandle>> {
    if state.is_connected() {
        state.transport.clone()
    } else {
        None
    }
}

/// Keep the local participant's audio flag in step with the mute state.
fn sync_local_audio(state: &mut SessionState, muted: bool) {
    if let Some(id) = state.registry.local().map(|p| p.id.clone()) {
        state.registry.merge(&ParticipantUpdate::new(id).audio(!muted));
    }
}
