use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config write error: {0}")]
    WriteError(String),
}

/// Failures surfaced by the voice session coordinator.
///
/// Every variant leaves the session `Idle` (or unchanged, for toggles)
/// with no transport left behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("voice chat requires a secure context: {0}")]
    SecurityContext(String),

    #[error("media devices unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to fetch voice credentials: {0}")]
    TokenFetch(String),

    #[error("failed to create voice transport: {0}")]
    TransportCreate(String),

    #[error("failed to join voice channel: {0}")]
    Join(String),

    #[error("{0}")]
    ToggleBlocked(String),

    #[error("not connected to a voice channel")]
    NotConnected,

    #[error("screen share failed: {0}")]
    ScreenShare(String),

    #[error("camera toggle failed: {0}")]
    Video(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HuddleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
