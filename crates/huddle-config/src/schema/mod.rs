//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod devices;
mod logging;
mod screen_share;
mod voice;

pub use devices::*;
pub use logging::*;
pub use screen_share::*;
pub use voice::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}
