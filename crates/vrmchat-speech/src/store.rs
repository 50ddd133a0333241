//! Per-utterance chunk records.

use crate::types::{AudioClip, ChunkSnapshot, ChunkStatus};

/// One segment of an utterance and its synthesized audio
#[derive(Debug, Clone)]
pub struct Chunk {
    text: String,
    audio: Option<AudioClip>,
    status: ChunkStatus,
}

impl Chunk {
    fn new(text: String) -> Self {
        Self {
            text,
            audio: None,
            status: ChunkStatus::Pending,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> ChunkStatus {
        self.status
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Ordered chunks of the current utterance plus the playback cursor.
///
/// Indices are positions in segmentation order and never change. Every
/// mutator is a no-op returning `false` (or `None`) when the index is out of
/// range or the status change would move a chunk backwards.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    current_index: Option<usize>,
}

impl ChunkStore {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            chunks: texts.into_iter().map(Chunk::new).collect(),
            current_index: None,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn status(&self, index: usize) -> Option<ChunkStatus> {
        self.chunks.get(index).map(|c| c.status)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Index of the chunk that is currently playing, if any
    pub fn playing_index(&self) -> Option<usize> {
        self.chunks
            .iter()
            .position(|c| c.status == ChunkStatus::Playing)
    }

    fn transition(&mut self, index: usize, next: ChunkStatus) -> bool {
        match self.chunks.get_mut(index) {
            Some(chunk) if chunk.status.can_transition_to(next) => {
                chunk.status = next;
                true
            }
            _ => false,
        }
    }

    pub fn mark_loading(&mut self, index: usize) -> bool {
        self.transition(index, ChunkStatus::Loading)
    }

    /// Attach synthesized audio and mark the chunk ready
    pub fn store_audio(&mut self, index: usize, clip: AudioClip) -> bool {
        if !self.transition(index, ChunkStatus::Ready) {
            return false;
        }
        self.chunks[index].audio = Some(clip);
        true
    }

    pub fn mark_error(&mut self, index: usize) -> bool {
        let marked = self.transition(index, ChunkStatus::Error);
        if marked {
            self.chunks[index].audio = None;
        }
        marked
    }

    /// Move a ready chunk to `Playing`, point the cursor at it and hand its
    /// audio over to the caller. The store keeps no copy of the clip.
    pub fn begin_playing(&mut self, index: usize) -> Option<(AudioClip, String)> {
        if let Some(playing) = self.playing_index() {
            log::warn!(
                "Refusing to start chunk {} while chunk {} is playing",
                index,
                playing
            );
            return None;
        }
        let chunk = self.chunks.get(index)?;
        if chunk.status != ChunkStatus::Ready || chunk.audio.is_none() {
            return None;
        }
        self.transition(index, ChunkStatus::Playing);
        self.current_index = Some(index);
        let chunk = &mut self.chunks[index];
        let clip = chunk.audio.take()?;
        Some((clip, chunk.text.clone()))
    }

    /// Settle a playing chunk as `Done` (or `Error` when playback failed)
    pub fn finish_playing(&mut self, index: usize, succeeded: bool) -> bool {
        if self.status(index) != Some(ChunkStatus::Playing) {
            return false;
        }
        let next = if succeeded {
            ChunkStatus::Done
        } else {
            ChunkStatus::Error
        };
        self.transition(index, next)
    }

    /// Point the cursor at `index`, or clear it when `index` is past the end
    pub fn set_cursor(&mut self, index: usize) {
        self.current_index = (index < self.chunks.len()).then_some(index);
    }

    pub fn clear_cursor(&mut self) {
        self.current_index = None;
    }

    pub fn snapshots(&self) -> Vec<ChunkSnapshot> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| ChunkSnapshot {
                index,
                text: chunk.text.clone(),
                status: chunk.status,
                has_audio: chunk.audio.is_some(),
            })
            .collect()
    }

    /// Text of every chunk strictly before the cursor, or the whole text once
    /// every chunk has settled
    pub fn spoken_text(&self) -> String {
        let end = match self.current_index {
            Some(index) => index.min(self.chunks.len()),
            None if self.is_settled() => self.chunks.len(),
            None => 0,
        };
        self.chunks[..end].iter().map(|c| c.text.as_str()).collect()
    }

    /// Whether every chunk has reached `Done` or `Error`
    pub fn is_settled(&self) -> bool {
        !self.chunks.is_empty() && self.chunks.iter().all(|c| c.status.is_terminal())
    }
}
