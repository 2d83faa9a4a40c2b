use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::coordinator::VoiceCoordinator;

/// Global shortcuts routed to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeybindEvent {
    ToggleMute,
    ToggleDeafen,
    PushToTalkStart,
    PushToTalkEnd,
}

impl VoiceCoordinator {
    pub fn handle_keybind(&self, event: KeybindEvent) {
        debug!(?event, "voice keybind");
        match event {
            KeybindEvent::ToggleMute => {
                // Refusal is already surfaced as a notification.
                let _ = self.toggle_mute();
            }
            KeybindEvent::ToggleDeafen => {
                self.toggle_deafen();
            }
            KeybindEvent::PushToTalkStart => {
                self.push_to_talk_start();
            }
            KeybindEvent::PushToTalkEnd => {
                self.push_to_talk_end();
            }
        }
    }

    /// Route keybind events to this coordinator until the sender closes or
    /// the coordinator is dropped.
    pub fn spawn_keybind_listener(&self, mut events: mpsc::Receiver<KeybindEvent>) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                VoiceCoordinator { inner }.handle_keybind(event);
            }
            debug!("keybind listener stopped");
        })
    }
}
