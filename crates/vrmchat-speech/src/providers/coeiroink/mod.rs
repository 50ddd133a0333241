//! COEIROINK provider
//!
//! Talks to a local or remote COEIROINK engine over its HTTP API.
//!
//! # Examples
//!
//! ```no_run
//! use vrmchat_speech::providers::coeiroink::{CoeiroinkConfig, CoeiroinkProvider};
//! use vrmchat_speech::{SpeechRequest, TTSModelsProvider, TTSSpeechProvider, Voice};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = CoeiroinkProvider::new(CoeiroinkConfig::default())?;
//!
//!     let speakers = provider.list_speakers().await?;
//!     let speaker = &speakers[0];
//!
//!     let clip = provider
//!         .synthesize(SpeechRequest {
//!             text: "こんにちは。".to_string(),
//!             voice: Voice::new(speaker.speaker_uuid.clone(), speaker.styles[0].id),
//!         })
//!         .await?;
//!     println!("{} bytes", clip.map(|c| c.len()).unwrap_or(0));
//!     Ok(())
//! }
//! ```

pub mod config;

mod provider;

pub use config::CoeiroinkConfig;
pub use provider::CoeiroinkProvider;
