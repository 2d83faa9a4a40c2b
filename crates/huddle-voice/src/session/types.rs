use std::fmt;

use huddle_common::{ChannelId, Notification};

use crate::participants::{Participant, ParticipantId};
use crate::screen_share::ScreenShareState;

/// Lifecycle of the session. The single source of truth for connected-ness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Connecting,
    Connected,
    /// Teardown has started.
    Leaving,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Leaving => "leaving",
        };
        f.write_str(name)
    }
}

/// Events emitted by the coordinator for the UI.
#[derive(Debug, Clone)]
pub enum VoiceEvent {
    PhaseChanged {
        phase: SessionPhase,
        channel_id: Option<ChannelId>,
    },
    ParticipantJoined(Participant),
    ParticipantLeft {
        participant_id: ParticipantId,
    },
    ParticipantUpdated(Participant),
    SpeakingChanged {
        participant_id: ParticipantId,
        speaking: bool,
    },
    MuteChanged {
        muted: bool,
    },
    DeafenChanged {
        deafened: bool,
    },
    VideoChanged {
        enabled: bool,
    },
    ScreenShareChanged(ScreenShareState),
    /// A toast for the user.
    Notify(Notification),
}
