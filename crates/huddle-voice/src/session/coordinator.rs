use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use huddle_common::{new_correlation_id, ChannelId, Notification, VoiceError};
use huddle_config::{SettingsStore, VoiceConfig};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::types::{SessionPhase, VoiceEvent};
use crate::identity::Identity;
use crate::mute::{MuteDeafenController, MuteDeafenState};
use crate::participants::{Participant, ParticipantRegistry};
use crate::screen_share::ScreenShareState;
use crate::services::{AudioRenderer, MediaEnvironment, PresencePublisher, TokenService};
use crate::settings::DeviceSettingsManager;
use crate::speaking::SpeakingDetector;
use crate::transport::{
    JoinRequest, TransportEvent, TransportFactory, TransportHandle, TransportOptions,
};

/// External services the coordinator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transports: Arc<dyn TransportFactory>,
    pub tokens: Arc<dyn TokenService>,
    pub presence: Arc<dyn PresencePublisher>,
    pub media: Arc<dyn MediaEnvironment>,
    pub renderer: Arc<dyn AudioRenderer>,
}

pub(super) struct ActiveChannel {
    pub id: ChannelId,
    pub name: String,
}

/// Everything that changes over a session, behind one lock.
pub(super) struct SessionState {
    pub phase: SessionPhase,
    pub channel: Option<ActiveChannel>,
    pub transport: Option<Arc<dyn TransportHandle>>,
    /// Bumped whenever the current attempt or session is abandoned. Async
    /// work captures it and drops its result if it has moved on.
    pub epoch: u64,
    pub registry: ParticipantRegistry,
    pub mute: MuteDeafenController,
    pub screen_share: ScreenShareState,
    pub video_enabled: bool,
}

/// What is left to tear down after a session has been detached from state.
pub(super) struct DetachedSession {
    pub channel: Option<ActiveChannel>,
    pub transport: Option<Arc<dyn TransportHandle>>,
}

impl SessionState {
    /// Invalidate the running session and reset per-call state in one step.
    /// The phase is left for the caller to set.
    pub fn detach(&mut self) -> DetachedSession {
        self.epoch += 1;
        self.registry.clear();
        self.mute.reset();
        self.screen_share = ScreenShareState::default();
        self.video_enabled = false;
        DetachedSession {
            channel: self.channel.take(),
            transport: self.transport.take(),
        }
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel.as_ref().map(|c| c.id.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Connected
    }
}

pub(super) struct Inner {
    pub identity: Identity,
    pub config: VoiceConfig,
    pub services: Collaborators,
    pub state: Mutex<SessionState>,
    /// Kept apart from `state` so saving to disk never blocks session work.
    pub settings: Mutex<DeviceSettingsManager>,
    pub speaking: SpeakingDetector,
    pub events: mpsc::Sender<VoiceEvent>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        let Some(transport) = state.transport.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = transport.destroy().await {
                        warn!("failed to destroy transport on drop: {e}");
                    }
                });
            }
            Err(_) => warn!("voice coordinator dropped outside a runtime; transport not destroyed"),
        }
    }
}

/// Owns the lifecycle of a single voice session.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct VoiceCoordinator {
    pub(super) inner: Arc<Inner>,
}

enum JoinStep {
    Ignore,
    Begin {
        epoch: u64,
        stale: Option<Arc<dyn TransportHandle>>,
    },
    Switch {
        detached: DetachedSession,
        epoch: u64,
    },
}

impl VoiceCoordinator {
    /// Create a coordinator and the receiver for its events.
    ///
    /// Device and screen-share preferences are loaded from `settings`.
    pub fn new(
        identity: Identity,
        config: VoiceConfig,
        services: Collaborators,
        settings: SettingsStore,
    ) -> (Self, mpsc::Receiver<VoiceEvent>) {
        let (events, rx) = mpsc::channel(config.event_buffer.max(1));
        let speaking = SpeakingDetector::new(
            Duration::from_millis(config.speaking_debounce_ms),
            config.audio_level_floor,
            events.clone(),
        );
        let state = SessionState {
            phase: SessionPhase::Idle,
            channel: None,
            transport: None,
            epoch: 0,
            registry: ParticipantRegistry::new(),
            mute: MuteDeafenController::new(),
            screen_share: ScreenShareState::default(),
            video_enabled: false,
        };
        let inner = Inner {
            identity,
            config,
            services,
            state: Mutex::new(state),
            settings: Mutex::new(DeviceSettingsManager::load(settings)),
            speaking,
            events,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Join `channel_id`, shown to the user as `channel_name`.
    ///
    /// Joining the channel already joined, or calling this while a join or
    /// leave is in flight, does nothing. Joining a different channel fully
    /// tears down the current session first. A leave issued while this is
    /// pending cancels it and the call returns `Ok(())`.
    pub async fn join_channel(
        &self,
        channel_id: impl Into<ChannelId>,
        channel_name: &str,
    ) -> Result<(), VoiceError> {
        let channel_id = channel_id.into();
        let attempt = new_correlation_id();

        let step = {
            let mut state = self.lock();
            let phase = state.phase;
            match phase {
                SessionPhase::Connecting | SessionPhase::Leaving => {
                    debug!(%attempt, channel_id = %channel_id, %phase, "join ignored, session change in progress");
                    JoinStep::Ignore
                }
                SessionPhase::Connected
                    if state.channel.as_ref().map(|c| &c.id) == Some(&channel_id) =>
                {
                    debug!(%attempt, channel_id = %channel_id, "already in channel");
                    JoinStep::Ignore
                }
                SessionPhase::Connected => {
                    let detached = state.detach();
                    state.phase = SessionPhase::Leaving;
                    self.emit_phase(&state);
                    let from = detached.channel.as_ref().map(|c| c.id.to_string());
                    info!(%attempt, from = ?from, to = %channel_id, "switching voice channel");
                    JoinStep::Switch {
                        detached,
                        epoch: state.epoch,
                    }
                }
                SessionPhase::Idle => {
                    match self.begin_attempt(&mut state, &channel_id, channel_name) {
                        Ok((epoch, stale)) => JoinStep::Begin { epoch, stale },
                        Err(e) => {
                            drop(state);
                            return Err(self.reject_join(&attempt, e));
                        }
                    }
                }
            }
        };

        let (epoch, stale) = match step {
            JoinStep::Ignore => return Ok(()),
            JoinStep::Begin { epoch, stale } => (epoch, stale),
            JoinStep::Switch { detached, epoch } => {
                self.teardown(detached).await;
                let mut state = self.lock();
                if state.epoch != epoch {
                    // A leave arrived while the old session was going away.
                    state.phase = SessionPhase::Idle;
                    self.emit_phase(&state);
                    info!(%attempt, channel_id = %channel_id, "channel switch cancelled");
                    return Ok(());
                }
                match self.begin_attempt(&mut state, &channel_id, channel_name) {
                    Ok(started) => started,
                    Err(e) => {
                        state.phase = SessionPhase::Idle;
                        self.emit_phase(&state);
                        drop(state);
                        return Err(self.reject_join(&attempt, e));
                    }
                }
            }
        };

        info!(%attempt, channel_id = %channel_id, "joining voice channel");
        if let Some(stale) = stale {
            if let Err(e) = stale.destroy().await {
                warn!(%attempt, "failed to destroy stale transport: {e}");
            }
        }

        let credentials = match self.inner.services.tokens.join_credentials(&channel_id).await {
            Ok(credentials) => credentials,
            Err(e) => {
                return self
                    .abort_join(epoch, &attempt, None, VoiceError::TokenFetch(e.to_string()))
                    .await
            }
        };
        if !self.is_current(epoch) {
            debug!(%attempt, "join cancelled while fetching credentials");
            return Ok(());
        }

        let transport = match self.inner.services.transports.create(TransportOptions::default()) {
            Ok(transport) => transport,
            Err(e) => {
                return self
                    .abort_join(epoch, &attempt, None, VoiceError::TransportCreate(e.to_string()))
                    .await
            }
        };

        let attached = {
            let mut state = self.lock();
            let current = state.epoch == epoch;
            if current {
                state.transport = Some(Arc::clone(&transport));
            }
            current
        };
        if !attached {
            debug!(%attempt, "join cancelled before transport was attached");
            if let Err(e) = transport.destroy().await {
                warn!(%attempt, "failed to destroy abandoned transport: {e}");
            }
            return Ok(());
        }

        // Subscribe before joining so nothing emitted during the join is missed.
        self.spawn_event_pump(epoch, transport.subscribe());

        if let Err(e) = self
            .inner
            .services
            .media
            .acquire_microphone(&self.inner.config.microphone)
            .await
        {
            warn!(%attempt, "microphone constraints not applied, using transport defaults: {e}");
        }

        let start_audio_off = self.lock().mute.state().muted;
        let request = JoinRequest {
            url: credentials.room_url,
            token: credentials.token,
            start_audio_off,
            start_video_off: true,
        };
        let room = match transport.join(request).await {
            Ok(room) => room,
            Err(e) => {
                return self
                    .abort_join(epoch, &attempt, Some(transport), VoiceError::Join(e.to_string()))
                    .await
            }
        };

        if self.inner.config.noise_cancellation {
            if let Err(e) = transport.enable_noise_cancellation().await {
                warn!(%attempt, "noise cancellation unavailable: {e}");
            }
        }

        let participants = {
            let mut state = self.lock();
            if state.epoch != epoch {
                debug!(%attempt, "join superseded before it completed");
                return Ok(());
            }
            let added = state.registry.populate(room.participants);
            // Deafened while connecting: the initial remotes were not known then.
            state.mute.silence_new_remotes(Some(&*transport), &added);
            if state.registry.local().is_none() {
                let local = self.inner.identity.local_participant(!start_audio_off);
                state.registry.register_local(local);
            }
            state.phase = SessionPhase::Connected;
            self.emit_phase(&state);

            // Published under the lock so a concurrent leave cannot run its
            // removal before this add.
            let mute = state.mute.state();
            self.inner.services.presence.add_user(
                &channel_id,
                self.inner.identity.summary(mute.muted, mute.deafened),
            );
            state.registry.len()
        };
        let devices = self.settings().devices().clone();

        if let Some(device) = devices.input_device() {
            if let Err(e) = transport.set_input_device(Some(device)).await {
                warn!(%attempt, device, "failed to apply saved input device: {e}");
            }
        }
        let renderer = &self.inner.services.renderer;
        if let Err(e) = renderer.set_output_device(devices.output_device()) {
            warn!(%attempt, "failed to apply saved output device: {e}");
        }
        renderer.set_output_volume(devices.output_volume);

        info!(%attempt, channel_id = %channel_id, participants, "joined voice channel");
        self.notify(Notification::info(format!("Joined {channel_name}")));
        Ok(())
    }

    /// Leave the current channel. Does nothing when idle; cancels a join
    /// that is still connecting.
    pub async fn leave_channel(&self) {
        let detached = {
            let mut state = self.lock();
            match state.phase {
                SessionPhase::Idle => return,
                SessionPhase::Leaving => {
                    // Teardown already running; make sure a pending switch stops there.
                    state.epoch += 1;
                    return;
                }
                SessionPhase::Connecting | SessionPhase::Connected => {}
            }
            let detached = state.detach();
            state.phase = SessionPhase::Leaving;
            self.emit_phase(&state);
            detached
        };

        let channel = detached.channel.as_ref().map(|c| c.id.to_string());
        self.teardown(detached).await;

        let mut state = self.lock();
        state.phase = SessionPhase::Idle;
        self.emit_phase(&state);
        info!(channel_id = ?channel, "left voice channel");
    }

    /// Leave any session and withdraw from presence entirely.
    pub async fn shutdown(&self) {
        self.leave_channel().await;
        self.inner
            .services
            .presence
            .remove_user_from_all_channels(&self.inner.identity.user_id);
        self.inner.speaking.clear();
        info!("voice coordinator shut down");
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.lock().channel_id()
    }

    pub fn channel_name(&self) -> Option<String> {
        self.lock().channel.as_ref().map(|c| c.name.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }

    /// Participants in join order, with live speaking flags.
    pub fn participants(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self.lock().registry.iter().cloned().collect();
        let speaking = self.inner.speaking.speaking();
        for p in &mut participants {
            p.is_speaking = speaking.contains(&p.id);
        }
        participants
    }

    pub fn local_participant(&self) -> Option<Participant> {
        let mut local = self.lock().registry.local().cloned()?;
        local.is_speaking = self.inner.speaking.is_speaking(&local.id);
        Some(local)
    }

    pub fn mute_state(&self) -> MuteDeafenState {
        self.lock().mute.state()
    }

    pub fn screen_share_state(&self) -> ScreenShareState {
        self.lock().screen_share.clone()
    }

    pub fn is_video_enabled(&self) -> bool {
        self.lock().video_enabled
    }

    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn settings(&self) -> MutexGuard<'_, DeviceSettingsManager> {
        self.inner
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn is_current(&self, epoch: u64) -> bool {
        self.lock().epoch == epoch
    }

    pub(super) fn emit(&self, event: VoiceEvent) {
        if let Err(e) = self.inner.events.try_send(event) {
            debug!("voice event dropped: {e}");
        }
    }

    pub(super) fn emit_phase(&self, state: &SessionState) {
        self.emit(VoiceEvent::PhaseChanged {
            phase: state.phase,
            channel_id: state.channel_id(),
        });
    }

    pub(super) fn notify(&self, notification: Notification) {
        self.emit(VoiceEvent::Notify(notification));
    }

    /// Mirror the local mute/deafen state into presence, if in a channel.
    pub(super) fn publish_voice_state(&self) {
        let (channel, mute) = {
            let state = self.lock();
            match (&state.channel, state.is_connected()) {
                (Some(channel), true) => (channel.id.clone(), state.mute.state()),
                _ => return,
            }
        };
        self.inner.services.presence.update_voice_state(
            &channel,
            &self.inner.identity.user_id,
            mute.muted,
            mute.deafened,
        );
    }

    /// Environment checks, then move to `Connecting`. Returns the new epoch
    /// and any transport left over from an earlier session.
    fn begin_attempt(
        &self,
        state: &mut SessionState,
        channel_id: &ChannelId,
        channel_name: &str,
    ) -> Result<(u64, Option<Arc<dyn TransportHandle>>), VoiceError> {
        let media = &self.inner.services.media;
        if !media.is_secure_context() {
            return Err(VoiceError::SecurityContext(
                "audio capture is only available over a secure connection".into(),
            ));
        }
        if !media.has_media_devices() {
            return Err(VoiceError::DeviceUnavailable(
                "no audio capture devices are available".into(),
            ));
        }

        state.epoch += 1;
        state.phase = SessionPhase::Connecting;
        state.channel = Some(ActiveChannel {
            id: channel_id.clone(),
            name: channel_name.to_string(),
        });
        self.emit_phase(state);
        Ok((state.epoch, state.transport.take()))
    }

    fn reject_join(&self, attempt: &str, err: VoiceError) -> VoiceError {
        error!(%attempt, "voice join rejected: {err}");
        self.notify(Notification::error(err.to_string()));
        err
    }

    /// Unwind a failed attempt. If the attempt was already cancelled the
    /// failure is moot and `Ok(())` is returned.
    async fn abort_join(
        &self,
        epoch: u64,
        attempt: &str,
        transport: Option<Arc<dyn TransportHandle>>,
        err: VoiceError,
    ) -> Result<(), VoiceError> {
        let current = {
            let mut state = self.lock();
            if state.epoch == epoch {
                // The stored transport, if any, is the one passed in.
                state.detach();
                state.phase = SessionPhase::Idle;
                self.emit_phase(&state);
                true
            } else {
                false
            }
        };
        if !current {
            debug!(%attempt, "join failed after cancellation: {err}");
            return Ok(());
        }

        self.inner.speaking.clear();
        if let Some(transport) = transport {
            if let Err(e) = transport.destroy().await {
                warn!(%attempt, "failed to destroy transport after failed join: {e}");
            }
        }
        self.release_playback();
        error!(%attempt, "voice join failed: {err}");
        self.notify(Notification::error(err.to_string()));
        Err(err)
    }

    /// Release everything a detached session held. Never fails.
    async fn teardown(&self, detached: DetachedSession) {
        self.inner.speaking.clear();
        if let Some(transport) = detached.transport {
            if let Err(e) = transport.leave().await {
                warn!("transport leave failed, destroying anyway: {e}");
            }
            if let Err(e) = transport.destroy().await {
                warn!("failed to destroy transport: {e}");
            }
        }
        self.release_playback();
        if let Some(channel) = detached.channel {
            self.inner
                .services
                .presence
                .remove_user(&channel.id, &self.inner.identity.user_id);
        }
    }

    /// Drop every remote audio sink and lift the deafen silence, matching
    /// the reset mute state.
    fn release_playback(&self) {
        let renderer = &self.inner.services.renderer;
        renderer.detach_all();
        renderer.set_muted(false);
    }

    /// Forward transport events to the handlers until the session moves on.
    fn spawn_event_pump(&self, epoch: u64, mut events: mpsc::Receiver<TransportEvent>) {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let coordinator = VoiceCoordinator { inner };
                if !coordinator.handle_transport_event(epoch, event).await {
                    break;
                }
            }
            debug!(epoch, "transport event pump stopped");
        });
    }
}
