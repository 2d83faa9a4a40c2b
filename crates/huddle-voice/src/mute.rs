//! Local mute, deafen and push-to-talk.
//!
//! Deafening always forces mute, and remembers the mute state it found so
//! undeafening restores it exactly. Transport calls made from here are
//! fire-and-forget: a failure is logged and local state stays as toggled.

use huddle_common::VoiceError;
use tracing::warn;

use crate::participants::ParticipantId;
use crate::transport::{Subscription, TransportHandle};

/// Snapshot of the local audio controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MuteDeafenState {
    pub muted: bool,
    pub deafened: bool,
    /// `Some` exactly while deafened.
    pub pre_deafen_mute_state: Option<bool>,
}

#[derive(Debug, Default)]
pub struct MuteDeafenController {
    state: MuteDeafenState,
    /// Mute state to restore when a push-to-talk hold ends.
    push_to_talk_restore: Option<bool>,
}

impl MuteDeafenController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MuteDeafenState {
        self.state
    }

    /// Flip mute. Rejected while deafened. Returns the new `muted` value.
    pub fn toggle_mute(
        &mut self,
        transport: Option<&dyn TransportHandle>,
    ) -> Result<bool, VoiceError> {
        if self.state.deafened {
            return Err(VoiceError::ToggleBlocked("undeafen first".into()));
        }
        // An explicit toggle wins over a push-to-talk hold.
        self.push_to_talk_restore = None;
        self.state.muted = !self.state.muted;
        set_local_audio(transport, !self.state.muted);
        Ok(self.state.muted)
    }

    /// Flip deafen. `remotes` are the participants whose playback is
    /// stopped or resumed. Returns the new `deafened` value.
    pub fn toggle_deafen(
        &mut self,
        transport: Option<&dyn TransportHandle>,
        remotes: &[ParticipantId],
    ) -> bool {
        if self.state.deafened {
            let restore = self.state.pre_deafen_mute_state.take().unwrap_or(false);
            self.state.deafened = false;
            self.state.muted = restore;
            if !restore {
                set_local_audio(transport, true);
            }
            set_playback(transport, remotes, true);
        } else {
            // A held push-to-talk key is not the user's real mute state.
            let current = self.push_to_talk_restore.take().unwrap_or(self.state.muted);
            self.state.pre_deafen_mute_state = Some(current);
            self.state.deafened = true;
            self.state.muted = true;
            if let Some(t) = transport {
                if t.local_audio_enabled() {
                    set_local_audio(transport, false);
                }
            }
            set_playback(transport, remotes, false);
        }
        self.state.deafened
    }

    /// Stop playback for participants who arrived while deafened. Does
    /// nothing when not deafened.
    pub fn silence_new_remotes(
        &self,
        transport: Option<&dyn TransportHandle>,
        remotes: &[ParticipantId],
    ) {
        if self.state.deafened {
            set_playback(transport, remotes, false);
        }
    }

    /// Temporarily unmute while the key is held. Returns `true` if the hold started.
    pub fn push_to_talk_start(&mut self, transport: Option<&dyn TransportHandle>) -> bool {
        if self.state.deafened || self.push_to_talk_restore.is_some() {
            return false;
        }
        self.push_to_talk_restore = Some(self.state.muted);
        if self.state.muted {
            self.state.muted = false;
            set_local_audio(transport, true);
        }
        true
    }

    /// Release the hold, restoring the mute state from before it. Returns
    /// `true` if a hold was active.
    pub fn push_to_talk_end(&mut self, transport: Option<&dyn TransportHandle>) -> bool {
        let Some(restore) = self.push_to_talk_restore.take() else {
            return false;
        };
        if restore != self.state.muted {
            self.state.muted = restore;
            set_local_audio(transport, !restore);
        }
        true
    }

    /// Back to not muted, not deafened.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn set_local_audio(transport: Option<&dyn TransportHandle>, enabled: bool) {
    if let Some(t) = transport {
        if let Err(e) = t.set_local_audio_enabled(enabled) {
            warn!(enabled, "failed to set local audio: {e}");
        }
    }
}

fn set_playback(transport: Option<&dyn TransportHandle>, remotes: &[ParticipantId], audio: bool) {
    let Some(t) = transport else {
        return;
    };
    for id in remotes {
        if let Err(e) = t.update_participant_subscription(id, Subscription { audio }) {
            warn!(participant_id = %id, audio, "failed to update playback subscription: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, TransportCall};

    fn remotes() -> Vec<ParticipantId> {
        vec!["a".into(), "b".into()]
    }

    #[test]
    fn deafen_round_trip_restores_mute() {
        for initially_muted in [false, true] {
            let transport = FakeTransport::new(1);
            let mut ctl = MuteDeafenController::new();
            if initially_muted {
                ctl.toggle_mute(Some(&transport)).unwrap();
            }

            ctl.toggle_deafen(Some(&transport), &remotes());
            let state = ctl.state();
            assert!(state.deafened && state.muted);
            assert_eq!(state.pre_deafen_mute_state, Some(initially_muted));

            ctl.toggle_deafen(Some(&transport), &remotes());
            let state = ctl.state();
            assert!(!state.deafened);
            assert_eq!(state.muted, initially_muted);
            assert_eq!(state.pre_deafen_mute_state, None);
            assert_eq!(transport.local_audio_enabled(), !initially_muted);
        }
    }

    #[test]
    fn mute_is_blocked_while_deafened() {
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_deafen(None, &[]);
        let before = ctl.state();

        let err = ctl.toggle_mute(None).unwrap_err();
        assert_eq!(err, VoiceError::ToggleBlocked("undeafen first".into()));
        assert_eq!(ctl.state(), before);
    }

    #[test]
    fn deafen_stops_and_resumes_remote_playback() {
        let transport = FakeTransport::new(1);
        let mut ctl = MuteDeafenController::new();

        ctl.toggle_deafen(Some(&transport), &remotes());
        ctl.toggle_deafen(Some(&transport), &remotes());

        let subs: Vec<_> = transport
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Subscription(id, audio) => Some((id, audio)),
                _ => None,
            })
            .collect();
        assert_eq!(
            subs,
            vec![
                ("a".to_string(), false),
                ("b".to_string(), false),
                ("a".to_string(), true),
                ("b".to_string(), true),
            ]
        );
    }

    #[test]
    fn undeafen_keeps_mic_off_when_previously_muted() {
        let transport = FakeTransport::new(1);
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_mute(Some(&transport)).unwrap();
        ctl.toggle_deafen(Some(&transport), &[]);
        transport.take_calls();

        ctl.toggle_deafen(Some(&transport), &[]);
        assert!(!transport
            .calls()
            .contains(&TransportCall::SetLocalAudio(true)));
        assert!(!transport.local_audio_enabled());
    }

    #[test]
    fn transport_failure_does_not_roll_back() {
        let transport = FakeTransport::new(1);
        transport.fail_local_audio(true);
        let mut ctl = MuteDeafenController::new();

        assert!(ctl.toggle_mute(Some(&transport)).unwrap());
        assert!(ctl.state().muted);
    }

    #[test]
    fn push_to_talk_unmutes_while_held() {
        let transport = FakeTransport::new(1);
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_mute(Some(&transport)).unwrap();

        assert!(ctl.push_to_talk_start(Some(&transport)));
        assert!(!ctl.state().muted);
        assert!(transport.local_audio_enabled());

        assert!(ctl.push_to_talk_end(Some(&transport)));
        assert!(ctl.state().muted);
        assert!(!transport.local_audio_enabled());
    }

    #[test]
    fn push_to_talk_ignored_while_deafened() {
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_deafen(None, &[]);
        assert!(!ctl.push_to_talk_start(None));
        assert!(!ctl.push_to_talk_end(None));
        assert!(ctl.state().muted);
    }

    #[test]
    fn deafen_during_hold_remembers_real_mute_state() {
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_mute(None).unwrap();
        ctl.push_to_talk_start(None);

        ctl.toggle_deafen(None, &[]);
        assert_eq!(ctl.state().pre_deafen_mute_state, Some(true));
        assert!(!ctl.push_to_talk_end(None));

        ctl.toggle_deafen(None, &[]);
        assert!(ctl.state().muted);
    }

    #[test]
    fn mute_toggle_ends_hold() {
        let mut ctl = MuteDeafenController::new();
        ctl.push_to_talk_start(None);
        ctl.toggle_mute(None).unwrap();
        assert!(ctl.state().muted);
        assert!(!ctl.push_to_talk_end(None));
        assert!(ctl.state().muted);
    }

    #[test]
    fn newcomers_are_silenced_only_while_deafened() {
        let transport = FakeTransport::new(1);
        let mut ctl = MuteDeafenController::new();

        ctl.silence_new_remotes(Some(&transport), &remotes());
        assert!(transport.calls().is_empty());

        ctl.toggle_deafen(Some(&transport), &[]);
        transport.take_calls();
        ctl.silence_new_remotes(Some(&transport), &remotes());
        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Subscription("a".into(), false),
                TransportCall::Subscription("b".into(), false),
            ]
        );
    }

    #[test]
    fn reset_returns_to_defaults() {
        let mut ctl = MuteDeafenController::new();
        ctl.toggle_deafen(None, &[]);
        ctl.reset();
        assert_eq!(ctl.state(), MuteDeafenState::default());
    }
}
