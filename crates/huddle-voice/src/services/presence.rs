//! Who is in which voice channel, as shown in the sidebar.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use huddle_common::ChannelId;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// A user as listed under a voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: String,
    pub display_name: String,
    pub muted: bool,
    pub deafened: bool,
}

/// Publishes the local user's voice presence. Calls are fire-and-forget.
pub trait PresencePublisher: Send + Sync {
    fn add_user(&self, channel: &ChannelId, user: UserSummary);
    fn remove_user(&self, channel: &ChannelId, user_id: &str);
    fn remove_user_from_all_channels(&self, user_id: &str);
    fn update_voice_state(&self, channel: &ChannelId, user_id: &str, muted: bool, deafened: bool);
}

/// Changes broadcast by [`PresenceDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    UserJoined {
        channel: ChannelId,
        user: UserSummary,
    },
    UserLeft {
        channel: ChannelId,
        user_id: String,
    },
    VoiceStateChanged {
        channel: ChannelId,
        user_id: String,
        muted: bool,
        deafened: bool,
    },
}

/// Channel membership and user-channel mapping, kept under one lock so
/// they can never disagree.
#[derive(Default)]
struct DirectoryState {
    channels: HashMap<ChannelId, Vec<UserSummary>>,
    user_channels: HashMap<String, ChannelId>,
}

impl DirectoryState {
    fn remove(&mut self, channel: &ChannelId, user_id: &str) -> bool {
        let Some(users) = self.channels.get_mut(channel) else {
            return false;
        };
        let before = users.len();
        users.retain(|u| u.user_id != user_id);
        let removed = users.len() != before;
        if users.is_empty() {
            self.channels.remove(channel);
        }
        if self.user_channels.get(user_id) == Some(channel) {
            self.user_channels.remove(user_id);
        }
        removed
    }
}

/// In-memory presence directory. A user is listed in at most one channel.
pub struct PresenceDirectory {
    state: RwLock<DirectoryState>,
    changes: broadcast::Sender<PresenceChange>,
}

impl PresenceDirectory {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: RwLock::new(DirectoryState::default()),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceChange> {
        self.changes.subscribe()
    }

    pub fn users_in(&self, channel: &ChannelId) -> Vec<UserSummary> {
        self.read().channels.get(channel).cloned().unwrap_or_default()
    }

    pub fn channel_of(&self, user_id: &str) -> Option<ChannelId> {
        self.read().user_channels.get(user_id).cloned()
    }

    /// Total listed users across all channels.
    pub fn len(&self) -> usize {
        self.read().user_channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, change: PresenceChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PresenceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PresencePublisher for PresenceDirectory {
    fn add_user(&self, channel: &ChannelId, user: UserSummary) {
        let mut state = self.write();

        // Leave the previous channel first.
        let previous = state.user_channels.get(&user.user_id).cloned();
        let moved_from = match previous {
            Some(old) if &old != channel => {
                state.remove(&old, &user.user_id);
                Some(old)
            }
            _ => None,
        };

        let users = state.channels.entry(channel.clone()).or_default();
        match users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        state
            .user_channels
            .insert(user.user_id.clone(), channel.clone());
        drop(state);

        if let Some(old) = moved_from {
            self.publish(PresenceChange::UserLeft {
                channel: old,
                user_id: user.user_id.clone(),
            });
        }
        info!(channel_id = %channel, user_id = %user.user_id, "user joined voice channel");
        self.publish(PresenceChange::UserJoined {
            channel: channel.clone(),
            user,
        });
    }

    fn remove_user(&self, channel: &ChannelId, user_id: &str) {
        let removed = self.write().remove(channel, user_id);
        if removed {
            info!(channel_id = %channel, user_id, "user left voice channel");
            self.publish(PresenceChange::UserLeft {
                channel: channel.clone(),
                user_id: user_id.to_string(),
            });
        }
    }

    fn remove_user_from_all_channels(&self, user_id: &str) {
        let mut state = self.write();
        let channels: Vec<ChannelId> = state
            .channels
            .iter()
            .filter(|(_, users)| users.iter().any(|u| u.user_id == user_id))
            .map(|(id, _)| id.clone())
            .collect();
        for channel in &channels {
            state.remove(channel, user_id);
        }
        state.user_channels.remove(user_id);
        drop(state);

        for channel in channels {
            self.publish(PresenceChange::UserLeft {
                channel,
                user_id: user_id.to_string(),
            });
        }
    }

    fn update_voice_state(&self, channel: &ChannelId, user_id: &str, muted: bool, deafened: bool) {
        let mut state = self.write();
        let Some(user) = state
            .channels
            .get_mut(channel)
            .and_then(|users| users.iter_mut().find(|u| u.user_id == user_id))
        else {
            debug!(channel_id = %channel, user_id, "voice state for unlisted user ignored");
            return;
        };
        user.muted = muted;
        user.deafened = deafened;
        drop(state);

        self.publish(PresenceChange::VoiceStateChanged {
            channel: channel.clone(),
            user_id: user_id.to_string(),
            muted,
            deafened,
        });
    }
}
