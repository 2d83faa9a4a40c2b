//! Collaborators the coordinator talks to besides the transport.

mod media;
mod presence;
mod token;

pub use media::{AudioRenderer, MediaEnvironment, MediaError};
pub use presence::{PresenceChange, PresenceDirectory, PresencePublisher, UserSummary};
pub use token::{JoinCredentials, TokenError, TokenService};
