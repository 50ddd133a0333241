//! # VRM Chat Speech
//!
//! Chunked text-to-speech playback for a conversational VRM character.
//!
//! A response from the language model is split into punctuation-delimited
//! chunks. Each chunk is synthesized by a remote voice engine, the next few
//! chunks are prefetched while the current one plays, and lifecycle callbacks
//! let subtitle and mouth animation follow the audio.
//!
//! ## Architecture
//!
//! - `segment`: punctuation-based splitting of the response text
//! - `TTSSpeechProvider`: the synthesis collaborator (one call per chunk)
//! - `AudioSink`: the single audio output device
//! - `ChunkedTTS`: the session controller; `start_synthesis` supersedes any
//!   utterance in progress, `stop` halts playback
//!
//! Cancellation is generational: every start or stop bumps an epoch, and
//! work that resumes under an older epoch is discarded without touching the
//! new utterance.
//!
//! ## Providers
//!
//! Enable integrations using feature flags:
//! - `coeiroink`: HTTP client for a COEIROINK voice engine
//! - `playback`: speaker output through rodio
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vrmchat_speech::{AudioSink, ChunkedTTS, ChunkedTTSConfig, TTSSpeechProvider, Voice};
//!
//! async fn speak(provider: Arc<dyn TTSSpeechProvider>, sink: Arc<dyn AudioSink>) {
//!     let config = ChunkedTTSConfig::new(Voice::new("3c37646f-3881-5374-2a83-149267990abc", 0));
//!     let tts = ChunkedTTS::new(provider, sink, config).unwrap();
//!
//!     tts.on_chunk_start(|index, text| println!("[{index}] {text}"));
//!     tts.on_all_complete(|| println!("done"));
//!     tts.start_synthesis("こんにちは。今日は良い天気ですね！").await;
//! }
//! ```

mod callbacks;
pub mod config;
pub mod error;
pub mod playback;
mod prefetch;
mod provider;
pub mod segment;
mod sequencer;
mod session;
pub mod store;
pub mod types;

// Provider implementations
pub mod providers;

pub use callbacks::{AllCompleteCallback, ChunkEndCallback, ChunkStartCallback};
pub use config::ChunkedTTSConfig;
pub use error::{ConfigError, PlaybackError, PlaybackResult, TTSError, TTSResult};
pub use playback::{AudioSink, PlaybackHandle};
pub use provider::{TTSModelsProvider, TTSProvider, TTSSpeechProvider};
pub use segment::{Segmentation, split_by_punctuation, split_by_sentence, split_with_min_length};
pub use session::ChunkedTTS;
pub use types::{
    AudioClip, AudioFormat, ChunkSnapshot, ChunkStatus, PipelineSnapshot, Speaker, SpeakerStyle,
    SpeechRequest, Voice,
};
