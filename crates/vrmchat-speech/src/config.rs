//! Configuration for the chunked TTS pipeline

use crate::error::ConfigError;
use crate::segment::Segmentation;
use crate::types::Voice;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::ChunkedTTS`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkedTTSConfig {
    /// Voice used for every chunk of an utterance
    pub voice: Voice,

    /// Number of chunks synthesized ahead of the playback cursor (default: 2)
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: usize,

    /// How utterance text is split into chunks
    #[serde(default)]
    pub segmentation: Segmentation,

    /// Upper bound for a single synthesis call (default: 30s, `None` waits forever)
    #[serde(default = "default_synthesis_timeout_ms")]
    pub synthesis_timeout_ms: Option<u64>,
}

fn default_prefetch_count() -> usize {
    2
}

fn default_synthesis_timeout_ms() -> Option<u64> {
    Some(30_000)
}

impl ChunkedTTSConfig {
    pub fn new(voice: Voice) -> Self {
        Self {
            voice,
            prefetch_count: default_prefetch_count(),
            segmentation: Segmentation::default(),
            synthesis_timeout_ms: default_synthesis_timeout_ms(),
        }
    }

    pub fn with_prefetch_count(mut self, count: usize) -> Self {
        self.prefetch_count = count;
        self
    }

    pub fn with_segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = segmentation;
        self
    }

    pub fn with_synthesis_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.synthesis_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn synthesis_timeout(&self) -> Option<Duration> {
        self.synthesis_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice.speaker_uuid.trim().is_empty() {
            return Err(ConfigError::EmptySpeaker);
        }
        if let Segmentation::MinLength { min_len: 0 } = self.segmentation {
            return Err(ConfigError::ZeroMinLength);
        }
        if self.synthesis_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
