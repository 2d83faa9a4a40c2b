//! The voice session coordinator.
//!
//! One [`VoiceCoordinator`] owns the whole lifecycle of "being in a voice
//! channel": the transport handle, the participant registry, mute/deafen
//! state, screen sharing and presence. The UI drives it through its
//! methods and observes it through snapshots and the [`VoiceEvent`] stream;
//! nothing else touches the transport.

mod controls;
mod coordinator;
mod events;
mod keybinds;
mod types;


pub use coordinator::{Collaborators, VoiceCoordinator};
pub use keybinds::KeybindEvent;
pub use types::{SessionPhase, VoiceEvent};
