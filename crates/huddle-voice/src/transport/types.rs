//! Requests, results and events exchanged with the transport.

use huddle_config::ScreenShareSettings;

use crate::participants::{Participant, ParticipantId, ParticipantUpdate};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Options for a new transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub subscribe_to_tracks_automatically: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            subscribe_to_tracks_automatically: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub url: String,
    pub token: String,
    pub start_audio_off: bool,
    pub start_video_off: bool,
}

/// Participants present at the moment the join completed, local included.
#[derive(Debug, Clone, Default)]
pub struct JoinedRoom {
    pub participants: Vec<Participant>,
}

/// Local reception of one remote participant's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub audio: bool,
}

/// Capture constraints for a screen share. `None` leaves a dimension unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenShareConstraints {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<u32>,
    /// Include system audio when the platform offers it.
    pub audio: bool,
}

impl From<ScreenShareSettings> for ScreenShareConstraints {
    fn from(settings: ScreenShareSettings) -> Self {
        let (width, height) = match settings.resolution.dimensions() {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        Self {
            width,
            height,
            frame_rate: settings.fps.ideal(),
            audio: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
    Screen,
}

/// Everything the transport reports asynchronously.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Joined {
        participants: Vec<Participant>,
    },
    Left,
    ParticipantJoined(Participant),
    ParticipantLeft {
        participant_id: ParticipantId,
    },
    ParticipantUpdated(ParticipantUpdate),
    TrackStarted {
        participant_id: ParticipantId,
        kind: TrackKind,
        is_local: bool,
    },
    TrackStopped {
        participant_id: ParticipantId,
        kind: TrackKind,
    },
    ActiveSpeakerChanged {
        participant_id: Option<ParticipantId>,
    },
    /// Normalized input level sample in `0.0..=1.0`.
    AudioLevel {
        participant_id: ParticipantId,
        level: f64,
    },
    Error {
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("not supported by this transport: {0}")]
    Unsupported(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transport is not connected")]
    NotConnected,

    #[error("{0}")]
    Failed(String),
}
