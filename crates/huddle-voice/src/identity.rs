use huddle_common::new_id;

use crate::participants::Participant;
use crate::services::UserSummary;

/// The signed-in user driving this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// A throwaway identity with a random id.
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self::new(new_id(), display_name)
    }

    /// Stand-in local participant for when the transport did not report one.
    pub fn local_participant(&self, audio_enabled: bool) -> Participant {
        Participant {
            audio_enabled,
            ..Participant::local(self.user_id.clone(), self.display_name.clone())
        }
    }

    pub fn summary(&self, muted: bool, deafened: bool) -> UserSummary {
        UserSummary {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            muted,
            deafened,
        }
    }
}
