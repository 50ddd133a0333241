//! Configuration for the COEIROINK provider

use serde::{Deserialize, Serialize};

/// Connection and prosody settings for a COEIROINK engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoeiroinkConfig {
    /// Engine base URL (default: "http://127.0.0.1:50032")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Speaking rate multiplier (default: 1.0)
    #[serde(default = "default_unit_scale")]
    pub speed_scale: f32,

    /// Loudness multiplier (default: 1.0)
    #[serde(default = "default_unit_scale")]
    pub volume_scale: f32,

    /// Pitch shift (default: 0.0)
    #[serde(default)]
    pub pitch_scale: f32,

    /// Intonation strength (default: 1.0)
    #[serde(default = "default_unit_scale")]
    pub intonation_scale: f32,

    /// Silence before speech in seconds (default: 0.1)
    #[serde(default = "default_pre_phoneme_length")]
    pub pre_phoneme_length: f32,

    /// Silence after speech in seconds (default: 0.1)
    #[serde(default = "default_post_phoneme_length")]
    pub post_phoneme_length: f32,

    /// Output sample rate in Hz (default: 24000)
    #[serde(default = "default_sampling_rate")]
    pub output_sampling_rate: u32,
}

fn default_base_url() -> String {
    "http://127.0.0.1:50032".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_unit_scale() -> f32 {
    1.0
}

fn default_pre_phoneme_length() -> f32 {
    0.1
}

fn default_post_phoneme_length() -> f32 {
    0.1
}

fn default_sampling_rate() -> u32 {
    24000
}

impl CoeiroinkConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_speed_scale(mut self, scale: f32) -> Self {
        self.speed_scale = scale;
        self
    }
}

impl Default for CoeiroinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            speed_scale: default_unit_scale(),
            volume_scale: default_unit_scale(),
            pitch_scale: 0.0,
            intonation_scale: default_unit_scale(),
            pre_phoneme_length: default_pre_phoneme_length(),
            post_phoneme_length: default_post_phoneme_length(),
            output_sampling_rate: default_sampling_rate(),
        }
    }
}
