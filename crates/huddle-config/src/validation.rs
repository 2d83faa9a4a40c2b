//! Config validation.
//!
//! Checks numeric ranges and collects every violation into one error.

use crate::schema::HuddleConfig;
use huddle_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HuddleConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let voice = &config.voice;

    validate_range(
        &mut errors,
        "voice.speaking_debounce_ms",
        voice.speaking_debounce_ms,
        50,
        5_000,
    );
    validate_range_f64(
        &mut errors,
        "voice.audio_level_floor",
        voice.audio_level_floor,
        0.0,
        1.0,
    );
    validate_range(
        &mut errors,
        "voice.event_buffer",
        voice.event_buffer as u64,
        16,
        65_536,
    );
    validate_range(
        &mut errors,
        "voice.microphone.channel_count",
        voice.microphone.channel_count.into(),
        1,
        2,
    );
    validate_range(
        &mut errors,
        "voice.microphone.sample_rate",
        voice.microphone.sample_rate.into(),
        8_000,
        96_000,
    );

    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_range_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
