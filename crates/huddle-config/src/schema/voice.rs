//! Voice session tunables.

use serde::{Deserialize, Serialize};

/// Microphone capture constraints requested on a best-effort basis at join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrophoneConfig {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub channel_count: u32,
    pub sample_rate: u32,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            channel_count: 1,
            sample_rate: 48_000,
        }
    }
}

/// Coordinator behavior: speaking debounce, event buffering, noise handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// How long a participant stays "speaking" after the last activity signal.
    pub speaking_debounce_ms: u64,
    /// Audio level (0.0-1.0) above which a sample counts as speech.
    pub audio_level_floor: f64,
    /// Capacity of the coordinator's outbound event channel.
    pub event_buffer: usize,
    /// Ask the transport for its noise-cancellation processor after joining.
    pub noise_cancellation: bool,
    pub microphone: MicrophoneConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            speaking_debounce_ms: 300,
            audio_level_floor: 0.05,
            event_buffer: 256,
            noise_cancellation: true,
            microphone: MicrophoneConfig::default(),
        }
    }
}
