//! Voice session coordination for Huddle.
//!
//! [`VoiceCoordinator`] is the single owner of a voice session: it joins and
//! leaves channels through a [`TransportHandle`], keeps the participant
//! registry in step with transport events, and exposes mute, deafen,
//! push-to-talk, camera, screen sharing and device controls. The transport,
//! token service, presence store and audio playback are traits supplied by
//! the host application.

pub mod identity;
pub mod mute;
pub mod participants;
pub mod screen_share;
pub mod services;
pub mod session;
pub mod settings;
pub mod speaking;
pub mod transport;

#[cfg(test)]
mod testing;

pub use identity::Identity;
pub use mute::{MuteDeafenController, MuteDeafenState};
pub use participants::{Participant, ParticipantId, ParticipantRegistry, ParticipantUpdate};
pub use screen_share::ScreenShareState;
pub use services::{
    AudioRenderer, JoinCredentials, MediaEnvironment, MediaError, PresenceChange,
    PresenceDirectory, PresencePublisher, TokenError, TokenService, UserSummary,
};
pub use session::{Collaborators, KeybindEvent, SessionPhase, VoiceCoordinator, VoiceEvent};
pub use settings::DeviceSettingsManager;
pub use speaking::SpeakingDetector;
pub use transport::{
    JoinRequest, JoinedRoom, ScreenShareConstraints, Subscription, TrackKind, TransportError,
    TransportEvent, TransportFactory, TransportHandle, TransportOptions,
};
