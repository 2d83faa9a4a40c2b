//! Logging configuration.

use serde::{Deserialize, Serialize};

/// `tracing` filter directive handed to the subscriber by the host app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "huddle=info".into(),
        }
    }
}
