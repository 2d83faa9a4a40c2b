use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::participants::ParticipantId;

use super::types::{
    JoinRequest, JoinedRoom, ScreenShareConstraints, Subscription, TransportError, TransportEvent,
    TransportOptions,
};

/// Creates one transport session per call.
pub trait TransportFactory: Send + Sync {
    fn create(&self, options: TransportOptions) -> Result<Arc<dyn TransportHandle>, TransportError>;
}

/// A live transport session.
///
/// The synchronous controls are fire-and-forget: they report failure but
/// the caller does not roll back its own state when they do.
#[async_trait]
pub trait TransportHandle: Send + Sync {
    /// Event stream for this session. Called once, before [`join`](Self::join).
    fn subscribe(&self) -> mpsc::Receiver<TransportEvent>;

    async fn join(&self, request: JoinRequest) -> Result<JoinedRoom, TransportError>;
    async fn leave(&self) -> Result<(), TransportError>;
    async fn destroy(&self) -> Result<(), TransportError>;

    fn set_local_audio_enabled(&self, enabled: bool) -> Result<(), TransportError>;
    fn local_audio_enabled(&self) -> bool;

    async fn set_local_video_enabled(&self, enabled: bool) -> Result<(), TransportError>;
    async fn start_screen_share(
        &self,
        constraints: ScreenShareConstraints,
    ) -> Result<(), TransportError>;
    async fn stop_screen_share(&self) -> Result<(), TransportError>;

    /// Controls local reception of a remote participant's media only.
    fn update_participant_subscription(
        &self,
        participant: &ParticipantId,
        subscription: Subscription,
    ) -> Result<(), TransportError>;

    /// `None` selects the platform default microphone.
    async fn set_input_device(&self, device_id: Option<&str>) -> Result<(), TransportError>;

    /// Transport-side noise cancellation processor, if the transport has one.
    async fn enable_noise_cancellation(&self) -> Result<(), TransportError>;
}
