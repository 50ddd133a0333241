use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Encoded audio container returned by a synthesis engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Flac,
    Ogg,
}

/// One synthesized clip.
///
/// The payload is reference counted so handing it from the chunk store to the
/// output sink never copies the encoded audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Bytes,
    pub format: AudioFormat,
}

impl AudioClip {
    pub fn new(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    pub fn wav(data: impl Into<Bytes>) -> Self {
        Self::new(data, AudioFormat::Wav)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Voice selector passed with every synthesis call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Voice {
    /// Speaker identifier as published by the engine
    pub speaker_uuid: String,
    /// Style of that speaker (normal, happy, whisper, ...)
    pub style_id: i64,
}

impl Voice {
    pub fn new(speaker_uuid: impl Into<String>, style_id: i64) -> Self {
        Self {
            speaker_uuid: speaker_uuid.into(),
            style_id,
        }
    }
}

/// Speech synthesis request for a single chunk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: Voice,
}

/// A style offered by a speaker
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeakerStyle {
    pub name: String,
    pub id: i64,
}

/// A speaker offered by a synthesis engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Speaker {
    pub name: String,
    pub speaker_uuid: String,
    pub styles: Vec<SpeakerStyle>,
}

impl Speaker {
    /// Position of `style_id` within this speaker's style list
    pub fn style_index(&self, style_id: i64) -> Option<usize> {
        self.styles.iter().position(|style| style.id == style_id)
    }
}

/// Lifecycle of one chunk.
///
/// Progression is forward only: `Pending → Loading → Ready → Playing → Done`.
/// `Error` can be entered from any state that is not yet `Done` and is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Pending,
    Loading,
    Ready,
    Playing,
    Done,
    Error,
}

impl ChunkStatus {
    fn rank(self) -> u8 {
        match self {
            ChunkStatus::Pending => 0,
            ChunkStatus::Loading => 1,
            ChunkStatus::Ready => 2,
            ChunkStatus::Playing => 3,
            ChunkStatus::Done => 4,
            ChunkStatus::Error => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ChunkStatus::Done | ChunkStatus::Error)
    }

    /// Whether a chunk in this state may move to `next`
    pub fn can_transition_to(self, next: ChunkStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == ChunkStatus::Error || next.rank() > self.rank()
    }
}

/// Read-only view of one chunk
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub index: usize,
    pub text: String,
    pub status: ChunkStatus,
    pub has_audio: bool,
}

/// Read-only view of the whole pipeline
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub chunks: Vec<ChunkSnapshot>,
    pub current_index: Option<usize>,
    pub is_loading: bool,
    pub is_playing: bool,
}

impl PipelineSnapshot {
    /// Number of chunks currently in `status`
    pub fn count(&self, status: ChunkStatus) -> usize {
        self.chunks.iter().filter(|c| c.status == status).count()
    }
}
