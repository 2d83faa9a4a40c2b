//! Who is sharing their screen in the current call.

use crate::participants::{Participant, ParticipantId, ParticipantRegistry};

/// Screen share bookkeeping.
///
/// A single `active_sharer_id` is tracked for display. When the active
/// sharer stops, the next participant still flagged as sharing in the
/// registry takes over so concurrent shares are not lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenShareState {
    pub active_sharer_id: Option<ParticipantId>,
    /// Whether this client is the one sharing.
    pub is_local_sharing: bool,
}

impl ScreenShareState {
    /// Apply a participant's latest sharing flag. Returns `true` if anything changed.
    pub fn participant_updated(
        &mut self,
        participant: &Participant,
        registry: &ParticipantRegistry,
    ) -> bool {
        let before = self.clone();
        if participant.is_screen_sharing {
            self.active_sharer_id = Some(participant.id.clone());
            if participant.is_local {
                self.is_local_sharing = true;
            }
        } else {
            if self.active_sharer_id.as_ref() == Some(&participant.id) {
                self.active_sharer_id = registry.other_sharer(&participant.id).map(|p| p.id.clone());
            }
            if participant.is_local {
                self.is_local_sharing = false;
            }
        }
        *self != before
    }

    /// The participant has left; `registry` no longer contains them.
    pub fn participant_left(
        &mut self,
        participant: &Participant,
        registry: &ParticipantRegistry,
    ) -> bool {
        let before = self.clone();
        if self.active_sharer_id.as_ref() == Some(&participant.id) {
            self.active_sharer_id = registry.other_sharer(&participant.id).map(|p| p.id.clone());
            if participant.is_local {
                self.is_local_sharing = false;
            }
        }
        *self != before
    }

    pub fn started_locally(&mut self, local_id: Option<&ParticipantId>) {
        self.is_local_sharing = true;
        if let Some(id) = local_id {
            self.active_sharer_id = Some(id.clone());
        }
    }

    pub fn stopped_locally(&mut self, local_id: Option<&ParticipantId>, registry: &ParticipantRegistry) {
        self.is_local_sharing = false;
        if let Some(id) = local_id {
            if self.active_sharer_id.as_ref() == Some(id) {
                self.active_sharer_id = registry.other_sharer(id).map(|p| p.id.clone());
            }
        }
    }
}
