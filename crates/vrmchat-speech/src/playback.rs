//! Audio output.
//!
//! An [`AudioSink`] is the single output device shared by every utterance.
//! The session keeps the clip currently assigned to it in an [`AudioOutput`].

use crate::AudioClip;
use crate::error::{PlaybackError, PlaybackResult};
use tokio::sync::oneshot;

#[cfg(feature = "playback")]
mod rodio_sink;
#[cfg(feature = "playback")]
pub use rodio_sink::RodioSink;

/// Completion of one started clip
#[derive(Debug)]
pub struct PlaybackHandle {
    done: oneshot::Receiver<PlaybackResult<()>>,
}

impl PlaybackHandle {
    /// Create a handle and the sender the sink resolves when the clip ends.
    ///
    /// Dropping the sender without sending reports [`PlaybackError::Interrupted`].
    pub fn channel() -> (oneshot::Sender<PlaybackResult<()>>, Self) {
        let (tx, done) = oneshot::channel();
        (tx, Self { done })
    }

    /// A handle that has already settled with `result`
    pub fn settled(result: PlaybackResult<()>) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(result);
        handle
    }

    /// Wait until the clip has finished playing
    pub async fn finished(self) -> PlaybackResult<()> {
        self.done.await.unwrap_or(Err(PlaybackError::Interrupted))
    }
}

/// Output device that plays one clip at a time
pub trait AudioSink: Send + Sync {
    /// Start playing `clip`, replacing anything already playing.
    ///
    /// Returns once playback has begun; the handle resolves when it ends.
    fn start(&self, clip: &AudioClip) -> PlaybackResult<PlaybackHandle>;

    /// Stop output immediately. Pending handles resolve as interrupted.
    fn halt(&self);
}

/// The clip currently assigned to the output device.
///
/// A new assignment releases the previous clip only after the sink has
/// switched to the new one.
#[derive(Default)]
pub(crate) struct AudioOutput {
    current: Option<AudioClip>,
}

impl AudioOutput {
    /// Assign `clip` to `sink` and start it
    pub(crate) fn play(
        &mut self,
        sink: &dyn AudioSink,
        clip: AudioClip,
    ) -> PlaybackResult<PlaybackHandle> {
        let handle = sink.start(&clip);
        self.current = Some(clip);
        handle
    }

    /// Release the assigned clip without touching the sink
    pub(crate) fn release(&mut self) {
        self.current = None;
    }

    pub(crate) fn holds_clip(&self) -> bool {
        self.current.is_some()
    }
}
