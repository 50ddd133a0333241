use crate::{AudioClip, Speaker, SpeechRequest, TTSResult};
use async_trait::async_trait;

/// Marker Trait for TTS providers
///
/// Combines synthesis and speaker discovery into a single provider interface.
pub trait TTSProvider: TTSSpeechProvider + TTSModelsProvider + Send + Sync {}

impl<T> TTSProvider for T where T: TTSSpeechProvider + TTSModelsProvider + Send + Sync {}

/// Trait for per-chunk speech synthesis
#[async_trait]
pub trait TTSSpeechProvider: Send + Sync {
    /// Synthesize one chunk of text (required)
    ///
    /// # Returns
    /// `Ok(Some(clip))` with usable audio, `Ok(None)` when the engine produced
    /// nothing, or an error. The pipeline treats both negative outcomes the
    /// same way: the chunk is skipped.
    async fn synthesize(&self, request: SpeechRequest) -> TTSResult<Option<AudioClip>>;
}

/// Trait for speaker discovery
#[async_trait]
pub trait TTSModelsProvider: Send + Sync {
    /// List the speakers and styles the engine offers (optional)
    async fn list_speakers(&self) -> TTSResult<Vec<Speaker>> {
        Ok(vec![])
    }

    /// Short provider name used in logs and errors
    fn provider_name(&self) -> &str;
}
