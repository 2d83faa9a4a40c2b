//! Debounced speaking indicator.
//!
//! Activity signals arrive in bursts. Each one marks the participant as
//! speaking and (re)arms a single clear timer; the indicator drops once
//! the debounce window passes with no further signal.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::participants::ParticipantId;
use crate::session::VoiceEvent;

struct PendingClear {
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct DetectorState {
    pending: HashMap<ParticipantId, PendingClear>,
    next_generation: u64,
}

/// Tracks who is speaking. Timers are owned here and nowhere else.
pub struct SpeakingDetector {
    window: Duration,
    level_floor: f64,
    state: Arc<Mutex<DetectorState>>,
    events: mpsc::Sender<VoiceEvent>,
}

impl SpeakingDetector {
    pub fn new(window: Duration, level_floor: f64, events: mpsc::Sender<VoiceEvent>) -> Self {
        Self {
            window,
            level_floor,
            state: Arc::new(Mutex::new(DetectorState::default())),
            events,
        }
    }

    /// An activity signal for `id`. Must be called from within a tokio runtime.
    pub fn signal(&self, id: &ParticipantId) {
        let mut state = lock(&self.state);
        let generation = state.next_generation;
        state.next_generation += 1;

        let was_speaking = match state.pending.remove(id) {
            Some(previous) => {
                previous.timer.abort();
                true
            }
            None => false,
        };

        let timer = tokio::spawn(clear_after(
            Arc::clone(&self.state),
            id.clone(),
            generation,
            self.window,
            self.events.clone(),
        ));
        state
            .pending
            .insert(id.clone(), PendingClear { generation, timer });
        drop(state);

        if !was_speaking {
            emit(&self.events, id, true);
        }
    }

    /// A level sample; counts as activity only above the configured floor.
    pub fn observe_level(&self, id: &ParticipantId, level: f64) -> bool {
        if level < self.level_floor {
            return false;
        }
        self.signal(id);
        true
    }

    /// Forget `id`, cancelling its pending timer.
    pub fn remove(&self, id: &ParticipantId) {
        if let Some(pending) = lock(&self.state).pending.remove(id) {
            pending.timer.abort();
        }
    }

    /// Cancel every pending timer.
    pub fn clear(&self) {
        let pending = std::mem::take(&mut lock(&self.state).pending);
        for (_, entry) in pending {
            entry.timer.abort();
        }
    }

    pub fn is_speaking(&self, id: &ParticipantId) -> bool {
        lock(&self.state).pending.contains_key(id)
    }

    pub fn speaking(&self) -> HashSet<ParticipantId> {
        lock(&self.state).pending.keys().cloned().collect()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Drop for SpeakingDetector {
    fn drop(&mut self) {
        self.clear();
    }
}

async fn clear_after(
    state: Arc<Mutex<DetectorState>>,
    id: ParticipantId,
    generation: u64,
    window: Duration,
    events: mpsc::Sender<VoiceEvent>,
) {
    tokio::time::sleep(window).await;

    let cleared = {
        let mut state = lock(&state);
        // A newer signal may have replaced this entry while we were waking up.
        match state.pending.get(&id) {
            Some(entry) if entry.generation == generation => {
                state.pending.remove(&id);
                true
            }
            _ => false,
        }
    };

    if cleared {
        emit(&events, &id, false);
    }
}

fn emit(events: &mpsc::Sender<VoiceEvent>, id: &ParticipantId, speaking: bool) {
    let event = VoiceEvent::SpeakingChanged {
        participant_id: id.clone(),
        speaking,
    };
    if events.try_send(event).is_err() {
        debug!(participant_id = %id, speaking, "speaking event dropped");
    }
}

fn lock(state: &Mutex<DetectorState>) -> MutexGuard<'_, DetectorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
