pub mod errors;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, HuddleError, VoiceError};
pub use id::{new_correlation_id, new_id, ChannelId};
pub use notifications::{Notification, NotificationLevel};

pub type Result<T> = std::result::Result<T, HuddleError>;
