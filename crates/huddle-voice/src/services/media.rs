use async_trait::async_trait;
use huddle_config::MicrophoneConfig;

use crate::participants::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// The host's media capabilities.
#[async_trait]
pub trait MediaEnvironment: Send + Sync {
    /// Microphone capture is only allowed from a secure origin.
    fn is_secure_context(&self) -> bool;

    fn has_media_devices(&self) -> bool;

    /// Open the microphone with the requested processing constraints.
    async fn acquire_microphone(&self, constraints: &MicrophoneConfig) -> Result<(), MediaError>;
}

/// Plays remote participants' audio locally.
///
/// Calls are fire-and-forget from the coordinator's side.
pub trait AudioRenderer: Send + Sync {
    /// A remote audio track became available.
    fn attach(&self, participant: &ParticipantId);
    fn detach(&self, participant: &ParticipantId);
    fn detach_all(&self);

    /// Silence all playback (deafen) or restore it.
    fn set_muted(&self, muted: bool);

    /// Volume in 0-100.
    fn set_output_volume(&self, volume: u8);

    /// `None` selects the platform default output.
    fn set_output_device(&self, device_id: Option<&str>) -> Result<(), MediaError>;
}
