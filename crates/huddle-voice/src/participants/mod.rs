//! Call participants and the registry derived from transport events.

mod registry;
mod types;

pub use registry::ParticipantRegistry;
pub use types::{Participant, ParticipantId, ParticipantUpdate};
