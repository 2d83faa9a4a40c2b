//! Applying transport events to session state.
//!
//! Every handler first checks that the event belongs to the running
//! session; events from a transport that has since been replaced or torn
//! down are dropped.

use std::sync::MutexGuard;

use huddle_common::Notification;
use tracing::{debug, info, warn};

use super::coordinator::{SessionState, VoiceCoordinator};
use super::types::VoiceEvent;
use crate::participants::{Participant, ParticipantId, ParticipantUpdate};
use crate::transport::{TrackKind, TransportEvent};

impl VoiceCoordinator {
    /// Returns `false` once the session the event pump serves is gone.
    pub(super) async fn handle_transport_event(&self, epoch: u64, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Left => {
                if !self.is_current(epoch) {
                    return false;
                }
                info!("transport reported the call ended");
                self.leave_channel().await;
                false
            }
            TransportEvent::Joined { participants } => self.on_joined(epoch, participants),
            TransportEvent::ParticipantJoined(participant) => {
                self.on_participant_joined(epoch, participant)
            }
            TransportEvent::ParticipantLeft { participant_id } => {
                self.on_participant_left(epoch, participant_id)
            }
            TransportEvent::ParticipantUpdated(update) => self.on_participant_updated(epoch, update),
            TransportEvent::TrackStarted {
                participant_id,
                kind,
                is_local,
            } => self.on_track(epoch, &participant_id, kind, is_local, true),
            TransportEvent::TrackStopped {
                participant_id,
                kind,
            } => self.on_track(epoch, &participant_id, kind, false, false),
            TransportEvent::ActiveSpeakerChanged { participant_id } => {
                let Some(state) = self.current(epoch) else {
                    return false;
                };
                if let Some(id) = participant_id.filter(|id| state.registry.contains(id)) {
                    self.inner.speaking.signal(&id);
                }
                true
            }
            TransportEvent::AudioLevel {
                participant_id,
                level,
            } => {
                let Some(state) = self.current(epoch) else {
                    return false;
                };
                if state.registry.contains(&participant_id) {
                    self.inner.speaking.observe_level(&participant_id, level);
                }
                true
            }
            TransportEvent::Error { message } => {
                if !self.is_current(epoch) {
                    return false;
                }
                warn!("voice transport error: {message}");
                self.notify(Notification::warning(format!("Voice connection problem: {message}")));
                true
            }
        }
    }

    /// The state lock, if `epoch` is still the running session.
    fn current(&self, epoch: u64) -> Option<MutexGuard<'_, SessionState>> {
        let state = self.lock();
        (state.epoch == epoch).then_some(state)
    }

    fn on_joined(&self, epoch: u64, participants: Vec<Participant>) -> bool {
        let Some(mut state) = self.current(epoch) else {
            return false;
        };
        let added = state.registry.populate(participants);
        state
            .mute
            .silence_new_remotes(state.transport.as_deref(), &added);
        debug!(added = added.len(), "participants from join event");
        true
    }

    fn on_participant_joined(&self, epoch: u64, participant: Participant) -> bool {
        let Some(mut state) = self.current(epoch) else {
            return false;
        };
        if !state.registry.insert(participant.clone()) {
            debug!(participant_id = %participant.id, "duplicate participant join ignored");
            return true;
        }

        // Late joiners must not be heard while deafened.
        if !participant.is_local {
            state.mute.silence_new_remotes(
                state.transport.as_deref(),
                std::slice::from_ref(&participant.id),
            );
        }

        debug!(participant_id = %participant.id, name = %participant.display_name, "participant joined");
        self.emit(VoiceEvent::ParticipantJoined(participant));
        true
    }

    fn on_participant_left(&self, epoch: u64, participant_id: ParticipantId) -> bool {
        let Some(mut guard) = self.current(epoch) else {
            return false;
        };
        let state = &mut *guard;
        let Some(removed) = state.registry.remove(&participant_id) else {
            return true;
        };

        self.inner.speaking.remove(&participant_id);
        if state.screen_share.participant_left(&removed, &state.registry) {
            self.emit(VoiceEvent::ScreenShareChanged(state.screen_share.clone()));
        }
        self.inner.services.renderer.detach(&participant_id);

        debug!(participant_id = %participant_id, "participant left");
        self.emit(VoiceEvent::ParticipantLeft { participant_id });
        true
    }

    fn on_participant_updated(&self, epoch: u64, update: ParticipantUpdate) -> bool {
        let Some(mut guard) = self.current(epoch) else {
            return false;
        };
        let state = &mut *guard;
        let Some(updated) = state.registry.merge(&update).cloned() else {
            debug!(participant_id = %update.id, "update for unknown participant ignored");
            return true;
        };

        if updated.is_local {
            state.video_enabled = updated.video_enabled;
        }
        if state.screen_share.participant_updated(&updated, &state.registry) {
            self.emit(VoiceEvent::ScreenShareChanged(state.screen_share.clone()));
        }
        self.emit(VoiceEvent::ParticipantUpdated(updated));
        true
    }

    fn on_track(
        &self,
        epoch: u64,
        participant_id: &ParticipantId,
        kind: TrackKind,
        is_local: bool,
        started: bool,
    ) -> bool {
        let Some(state) = self.current(epoch) else {
            return false;
        };
        // Only remote audio is played back here; video and screen tracks
        // are rendered by the UI.
        if kind != TrackKind::Audio || is_local {
            return true;
        }
        if state.registry.get(participant_id).is_some_and(|p| p.is_local) {
            return true;
        }
        let renderer = &self.inner.services.renderer;
        if started {
            renderer.attach(participant_id);
        } else {
            renderer.detach(participant_id);
        }
        true
    }
}
