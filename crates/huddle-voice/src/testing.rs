//! In-crate fakes for the coordinator's collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use huddle_common::{ChannelId, Notification};
use huddle_config::{MicrophoneConfig, SettingsStore, VoiceConfig};
use tokio::sync::{mpsc, Notify};

use crate::identity::Identity;
use crate::participants::{Participant, ParticipantId};
use crate::services::{
    AudioRenderer, JoinCredentials, MediaEnvironment, MediaError, PresenceDirectory,
    PresencePublisher, TokenError, TokenService, UserSummary,
};
use crate::session::{Collaborators, VoiceCoordinator, VoiceEvent};
use crate::transport::{
    JoinRequest, JoinedRoom, ScreenShareConstraints, Subscription, TransportError, TransportEvent,
    TransportFactory, TransportHandle, TransportOptions,
};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Ordered log shared by every fake, for asserting cross-service ordering.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        lock(&self.0).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Subscribe,
    Join(JoinRequest),
    Leave,
    Destroy,
    SetLocalAudio(bool),
    SetLocalVideo(bool),
    StartScreenShare(ScreenShareConstraints),
    StopScreenShare,
    Subscription(String, bool),
    SetInputDevice(Option<String>),
    NoiseCancellation,
}

/// How joins behave on transports handed out by [`FakeFactory`].
#[derive(Clone, Default)]
pub struct JoinScript {
    pub participants: Vec<Participant>,
    pub gate: Option<Arc<Notify>>,
    pub error: Option<TransportError>,
}

pub struct FakeTransport {
    pub id: usize,
    journal: Journal,
    calls: Mutex<Vec<TransportCall>>,
    events: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    audio_enabled: AtomicBool,
    fail_local_audio: AtomicBool,
    fail_leave: AtomicBool,
    fail_video: AtomicBool,
    screen_share_error: Mutex<Option<TransportError>>,
    script: Mutex<JoinScript>,
}

impl FakeTransport {
    pub fn new(id: usize) -> Self {
        Self::with_journal(id, Journal::default(), JoinScript::default())
    }

    fn with_journal(id: usize, journal: Journal, script: JoinScript) -> Self {
        Self {
            id,
            journal,
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(None),
            audio_enabled: AtomicBool::new(true),
            fail_local_audio: AtomicBool::new(false),
            fail_leave: AtomicBool::new(false),
            fail_video: AtomicBool::new(false),
            screen_share_error: Mutex::new(None),
            script: Mutex::new(script),
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        lock(&self.calls).clone()
    }

    pub fn take_calls(&self) -> Vec<TransportCall> {
        std::mem::take(&mut *lock(&self.calls))
    }

    pub fn fail_local_audio(&self, fail: bool) {
        self.fail_local_audio.store(fail, Ordering::SeqCst);
    }

    pub fn fail_leave(&self, fail: bool) {
        self.fail_leave.store(fail, Ordering::SeqCst);
    }

    pub fn fail_video(&self, fail: bool) {
        self.fail_video.store(fail, Ordering::SeqCst);
    }

    pub fn fail_screen_share(&self, error: Option<TransportError>) {
        *lock(&self.screen_share_error) = error;
    }

    pub fn was_destroyed(&self) -> bool {
        self.calls().contains(&TransportCall::Destroy)
    }

    /// Push an event as if the transport raised it.
    pub async fn emit(&self, event: TransportEvent) {
        let sender = lock(&self.events).clone();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }

    fn record(&self, call: TransportCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl TransportHandle for FakeTransport {
    fn subscribe(&self) -> mpsc::Receiver<TransportEvent> {
        self.record(TransportCall::Subscribe);
        let (tx, rx) = mpsc::channel(64);
        *lock(&self.events) = Some(tx);
        rx
    }

    async fn join(&self, request: JoinRequest) -> Result<JoinedRoom, TransportError> {
        self.journal.push(format!("join:{}", self.id));
        self.audio_enabled
            .store(!request.start_audio_off, Ordering::SeqCst);
        self.record(TransportCall::Join(request));
        let script = lock(&self.script).clone();
        if let Some(gate) = script.gate {
            gate.notified().await;
        }
        match script.error {
            Some(e) => Err(e),
            None => Ok(JoinedRoom {
                participants: script.participants,
            }),
        }
    }

    async fn leave(&self) -> Result<(), TransportError> {
        self.journal.push(format!("leave:{}", self.id));
        self.record(TransportCall::Leave);
        if self.fail_leave.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("leave rejected".into()));
        }
        Ok(())
    }

    async fn destroy(&self) -> Result<(), TransportError> {
        self.journal.push(format!("destroy:{}", self.id));
        self.record(TransportCall::Destroy);
        lock(&self.events).take();
        Ok(())
    }

    fn set_local_audio_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.record(TransportCall::SetLocalAudio(enabled));
        if self.fail_local_audio.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("audio track unavailable".into()));
        }
        self.audio_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn local_audio_enabled(&self) -> bool {
        self.audio_enabled.load(Ordering::SeqCst)
    }

    async fn set_local_video_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.record(TransportCall::SetLocalVideo(enabled));
        if self.fail_video.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("camera busy".into()));
        }
        Ok(())
    }

    async fn start_screen_share(
        &self,
        constraints: ScreenShareConstraints,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::StartScreenShare(constraints));
        match lock(&self.screen_share_error).clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn stop_screen_share(&self) -> Result<(), TransportError> {
        self.record(TransportCall::StopScreenShare);
        Ok(())
    }

    fn update_participant_subscription(
        &self,
        participant: &ParticipantId,
        subscription: Subscription,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::Subscription(
            participant.to_string(),
            subscription.audio,
        ));
        Ok(())
    }

    async fn set_input_device(&self, device_id: Option<&str>) -> Result<(), TransportError> {
        self.record(TransportCall::SetInputDevice(device_id.map(str::to_owned)));
        Ok(())
    }

    async fn enable_noise_cancellation(&self) -> Result<(), TransportError> {
        self.record(TransportCall::NoiseCancellation);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeFactory {
    journal: Journal,
    created: Mutex<Vec<Arc<FakeTransport>>>,
    script: Mutex<JoinScript>,
    fail: AtomicBool,
}

impl FakeFactory {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn script(&self, script: JoinScript) {
        *lock(&self.script) = script;
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        lock(&self.created).len()
    }

    pub fn created(&self) -> Vec<Arc<FakeTransport>> {
        lock(&self.created).clone()
    }

    pub fn last(&self) -> Arc<FakeTransport> {
        lock(&self.created)
            .last()
            .cloned()
            .expect("no transport created")
    }
}

impl TransportFactory for FakeFactory {
    fn create(&self, _options: TransportOptions) -> Result<Arc<dyn TransportHandle>, TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("factory unavailable".into()));
        }
        let mut created = lock(&self.created);
        let id = created.len() + 1;
        let transport = Arc::new(FakeTransport::with_journal(
            id,
            self.journal.clone(),
            lock(&self.script).clone(),
        ));
        created.push(Arc::clone(&transport));
        self.journal.push(format!("create:{id}"));
        Ok(transport)
    }
}

#[derive(Default)]
pub struct FakeTokens {
    journal: Journal,
    gate: Mutex<Option<Arc<Notify>>>,
    error: Mutex<Option<TokenError>>,
    pub requests: AtomicUsize,
}

impl FakeTokens {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    /// Hold every request until the gate is notified.
    pub fn gate(&self, gate: Arc<Notify>) {
        *lock(&self.gate) = Some(gate);
    }

    pub fn fail(&self, error: Option<TokenError>) {
        *lock(&self.error) = error;
    }
}

#[async_trait]
impl TokenService for FakeTokens {
    async fn join_credentials(&self, channel: &ChannelId) -> Result<JoinCredentials, TokenError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("token:{channel}"));
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(e) = lock(&self.error).clone() {
            return Err(e);
        }
        Ok(JoinCredentials {
            token: format!("token-for-{channel}"),
            room_url: format!("https://rooms.example/{channel}"),
        })
    }
}

pub struct FakeMedia {
    pub secure: AtomicBool,
    pub devices: AtomicBool,
    pub microphone_fails: AtomicBool,
    pub microphone_requests: AtomicUsize,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            secure: AtomicBool::new(true),
            devices: AtomicBool::new(true),
            microphone_fails: AtomicBool::new(false),
            microphone_requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaEnvironment for FakeMedia {
    fn is_secure_context(&self) -> bool {
        self.secure.load(Ordering::SeqCst)
    }

    fn has_media_devices(&self) -> bool {
        self.devices.load(Ordering::SeqCst)
    }

    async fn acquire_microphone(&self, _constraints: &MicrophoneConfig) -> Result<(), MediaError> {
        self.microphone_requests.fetch_add(1, Ordering::SeqCst);
        if self.microphone_fails.load(Ordering::SeqCst) {
            return Err(MediaError::DeviceNotFound("usb-mic".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCall {
    Attach(String),
    Detach(String),
    DetachAll,
    Muted(bool),
    Volume(u8),
    Device(Option<String>),
}

#[derive(Default)]
pub struct FakeRenderer {
    calls: Mutex<Vec<RendererCall>>,
}

impl FakeRenderer {
    pub fn calls(&self) -> Vec<RendererCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: RendererCall) {
        lock(&self.calls).push(call);
    }
}

impl AudioRenderer for FakeRenderer {
    fn attach(&self, participant: &ParticipantId) {
        self.record(RendererCall::Attach(participant.to_string()));
    }

    fn detach(&self, participant: &ParticipantId) {
        self.record(RendererCall::Detach(participant.to_string()));
    }

    fn detach_all(&self) {
        self.record(RendererCall::DetachAll);
    }

    fn set_muted(&self, muted: bool) {
        self.record(RendererCall::Muted(muted));
    }

    fn set_output_volume(&self, volume: u8) {
        self.record(RendererCall::Volume(volume));
    }

    fn set_output_device(&self, device_id: Option<&str>) -> Result<(), MediaError> {
        self.record(RendererCall::Device(device_id.map(str::to_owned)));
        Ok(())
    }
}

/// A real [`PresenceDirectory`] that also journals membership changes.
pub struct RecordingPresence {
    pub directory: PresenceDirectory,
    journal: Journal,
}

impl PresencePublisher for RecordingPresence {
    fn add_user(&self, channel: &ChannelId, user: UserSummary) {
        self.journal.push(format!("presence-add:{channel}"));
        self.directory.add_user(channel, user);
    }

    fn remove_user(&self, channel: &ChannelId, user_id: &str) {
        self.journal.push(format!("presence-remove:{channel}"));
        self.directory.remove_user(channel, user_id);
    }

    fn remove_user_from_all_channels(&self, user_id: &str) {
        self.directory.remove_user_from_all_channels(user_id);
    }

    fn update_voice_state(&self, channel: &ChannelId, user_id: &str, muted: bool, deafened: bool) {
        self.directory
            .update_voice_state(channel, user_id, muted, deafened);
    }
}

pub const LOCAL_USER: &str = "user-1";

/// A coordinator wired to fakes.
pub struct Harness {
    pub coordinator: VoiceCoordinator,
    pub events: mpsc::Receiver<VoiceEvent>,
    pub journal: Journal,
    pub factory: Arc<FakeFactory>,
    pub tokens: Arc<FakeTokens>,
    pub media: Arc<FakeMedia>,
    pub renderer: Arc<FakeRenderer>,
    pub presence: Arc<RecordingPresence>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(VoiceConfig::default(), SettingsStore::in_memory())
    }

    pub fn with(config: VoiceConfig, settings: SettingsStore) -> Self {
        let journal = Journal::default();
        let factory = Arc::new(FakeFactory::new(journal.clone()));
        factory.script(JoinScript {
            participants: vec![
                Participant::local("session-local", "Dana"),
                Participant::remote("r1", "Ann"),
                Participant::remote("r2", "Bob"),
            ],
            ..Default::default()
        });
        let tokens = Arc::new(FakeTokens::new(journal.clone()));
        let media = Arc::new(FakeMedia::default());
        let renderer = Arc::new(FakeRenderer::default());
        let presence = Arc::new(RecordingPresence {
            directory: PresenceDirectory::new(),
            journal: journal.clone(),
        });

        let services = Collaborators {
            transports: factory.clone(),
            tokens: tokens.clone(),
            presence: presence.clone(),
            media: media.clone(),
            renderer: renderer.clone(),
        };
        let (coordinator, events) =
            VoiceCoordinator::new(Identity::new(LOCAL_USER, "Dana"), config, services, settings);

        Self {
            coordinator,
            events,
            journal,
            factory,
            tokens,
            media,
            renderer,
            presence,
        }
    }

    pub fn drain_events(&mut self) -> Vec<VoiceEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn notifications(&mut self) -> Vec<Notification> {
        self.drain_events()
            .into_iter()
            .filter_map(|event| match event {
                VoiceEvent::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

/// Let spawned tasks (event pumps, timers due now) run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
