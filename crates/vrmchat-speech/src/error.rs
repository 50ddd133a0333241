use thiserror::Error;

/// Synthesis errors reported by a TTS provider.
#[derive(Error, Debug)]
pub enum TTSError {
    /// Provider-specific error
    #[error("TTS provider error: {0}\nProvider: {1}")]
    ProviderError(String, String),

    /// Speaker or style not offered by the engine
    #[error(
        "Voice not found: '{0}'\nAvailable: {1}\nSuggestion: Use list_speakers() to see the speakers and styles the engine offers"
    )]
    VoiceNotFound(String, String),

    /// Engine answered but produced no usable audio
    #[error("Audio generation failed: {0}\nInput text length: {1} characters")]
    GenerationFailed(String, usize),

    /// Synthesis did not settle within the configured bound
    #[error("Synthesis timed out after {0} ms\nInput text length: {1} characters")]
    Timeout(u64, usize),

    /// Transport failure talking to a remote engine
    #[cfg(feature = "coeiroink")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for TTS operations
pub type TTSResult<T> = Result<T, TTSError>;

/// Audio output errors.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The output device could not be opened
    #[error("Failed to initialize audio output stream: {0}")]
    InitFailed(String),

    /// The clip could not be decoded into a playable source
    #[error("Failed to decode audio clip ({0} bytes): {1}")]
    Decode(usize, String),

    /// Playback was halted before the clip ended
    #[error("Playback interrupted")]
    Interrupted,

    /// The output worker is gone
    #[error("Audio output is closed")]
    Closed,
}

/// Result type for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Invalid pipeline configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Minimum chunk length must be at least 1 character")]
    ZeroMinLength,

    #[error("Voice speaker uuid must not be empty")]
    EmptySpeaker,

    #[error("Synthesis timeout must be greater than zero when set")]
    ZeroTimeout,
}
