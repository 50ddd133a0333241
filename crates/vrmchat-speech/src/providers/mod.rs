//! Speech provider implementations
//!
//! This module contains concrete implementations of the TTS providers.
//! Each provider is feature-gated and can be enabled individually.

#[cfg(feature = "coeiroink")]
pub mod coeiroink;
