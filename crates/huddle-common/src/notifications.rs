use std::time::{Duration, Instant};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A single human-readable message for the toast overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    /// Info toast, shown for 3 seconds.
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, message, Duration::from_secs(3))
    }

    /// Warning toast, shown for 5 seconds.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Warning, message, Duration::from_secs(5))
    }

    /// Error toast, shown for 8 seconds.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message, Duration::from_secs(8))
    }

    fn with_level(level: NotificationLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}
