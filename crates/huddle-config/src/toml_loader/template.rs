//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> String {
    r##"# Huddle Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[voice]
# speaking_debounce_ms = 300        # 50-5000
# audio_level_floor = 0.05          # 0.0-1.0
# event_buffer = 256                # 16-65536
# noise_cancellation = true

[voice.microphone]
# echo_cancellation = true
# noise_suppression = true
# auto_gain_control = true
# channel_count = 1                 # 1-2
# sample_rate = 48000               # 8000-96000

[logging]
# level = "huddle=info"
"##
    .to_string()
}
