use async_trait::async_trait;
use huddle_common::ChannelId;

/// Short-lived credentials for one transport join.
#[derive(Clone, PartialEq, Eq)]
pub struct JoinCredentials {
    pub token: String,
    pub room_url: String,
}

impl std::fmt::Debug for JoinCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinCredentials")
            .field("token", &"[REDACTED]")
            .field("room_url", &self.room_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("not authorized to join {0}")]
    Unauthorized(ChannelId),

    #[error("voice channel {0} not found")]
    NotFound(ChannelId),

    #[error("token request failed: {0}")]
    Request(String),
}

/// Exchanges a channel id for join credentials.
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn join_credentials(&self, channel: &ChannelId) -> Result<JoinCredentials, TokenError>;
}
