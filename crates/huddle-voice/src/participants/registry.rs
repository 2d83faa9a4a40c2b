//! In-memory projection of the call's participants.
//!
//! The registry is only ever changed by transport events (plus the local
//! participant registered at join time). It never decides anything on its
//! own; the coordinator reads the return values to drive side effects.

use super::types::{Participant, ParticipantId, ParticipantUpdate};

/// Participants in join order, unique by id.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a participant. Duplicate joins are ignored; returns `false` for them.
    pub fn insert(&mut self, participant: Participant) -> bool {
        if self.contains(&participant.id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Insert every participant not already present. Returns the ids of
    /// the remote participants that were new.
    pub fn populate(
        &mut self,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Vec<ParticipantId> {
        let mut added = Vec::new();
        for participant in participants {
            let remote = (!participant.is_local).then(|| participant.id.clone());
            if self.insert(participant) {
                added.extend(remote);
            }
        }
        added
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| &p.id == id)?;
        Some(self.participants.remove(index))
    }

    /// Merge `update` into the matching entry. Unknown ids are ignored.
    pub fn merge(&mut self, update: &ParticipantUpdate) -> Option<&Participant> {
        let participant = self.participants.iter_mut().find(|p| p.id == update.id)?;
        participant.merge(update);
        Some(participant)
    }

    /// Register the local participant, marking an existing entry local if the
    /// transport already reported it.
    pub fn register_local(&mut self, participant: Participant) {
        match self.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => existing.is_local = true,
            None => self.participants.push(Participant {
                is_local: true,
                ..participant
            }),
        }
    }

    /// Drop every participant at once.
    pub fn clear(&mut self) {
        self.participants = Vec::new();
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some()
    }

    pub fn local(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_local)
    }

    pub fn remote_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| !p.is_local)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Any participant other than `except` that is currently sharing.
    pub fn other_sharer(&self, except: &ParticipantId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.is_screen_sharing && &p.id != except)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
