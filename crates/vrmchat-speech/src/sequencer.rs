//! Single-cursor playback: one chunk on the sink at a time, strictly in order.

use crate::callbacks::LifecycleEvent;
use crate::playback::PlaybackHandle;
use crate::session::Inner;
use std::sync::Arc;

/// Outcome of trying to put the cursor chunk on the sink
pub(crate) enum Step {
    Playing(PlaybackHandle),
    Skipped,
    Finished,
    Superseded,
}

pub(crate) struct Sequencer {
    inner: Arc<Inner>,
    epoch: u64,
    index: usize,
}

impl Sequencer {
    pub(crate) fn new(inner: Arc<Inner>, epoch: u64) -> Self {
        Self {
            inner,
            epoch,
            index: 0,
        }
    }

    /// Drive the utterance to its end, starting from an already attempted step
    pub(crate) async fn run(mut self, mut step: Step) {
        loop {
            match step {
                Step::Playing(handle) => {
                    if !self.complete(handle).await {
                        return;
                    }
                }
                Step::Skipped => {}
                Step::Finished | Step::Superseded => return,
            }
            self.index += 1;
            step = self.start_current().await;
        }
    }

    /// Acquire the cursor chunk and start it on the sink.
    pub(crate) async fn start_current(&mut self) -> Step {
        let inner = self.inner.clone();
        let (epoch, index) = (self.epoch, self.index);

        {
            let mut state = inner.lock();
            if !inner.is_current(epoch) {
                return Step::Superseded;
            }
            if index >= state.store.len() {
                state.store.clear_cursor();
                state.is_playing = false;
                state.output.release();
                drop(state);
                log::debug!("Utterance {} complete", epoch);
                inner.emit(epoch, LifecycleEvent::AllComplete);
                return Step::Finished;
            }
        }

        let acquired = tokio::select! {
            ready = inner.fetch_chunk(epoch, index) => ready,
            _ = inner.superseded(epoch) => return Step::Superseded,
        };
        if !acquired {
            if !inner.is_current(epoch) {
                return Step::Superseded;
            }
            log::warn!("Skipping chunk {} due to fetch failure", index);
            inner.emit(epoch, LifecycleEvent::ChunkEnd(index));
            return Step::Skipped;
        }

        // Epoch check, status change and sink assignment happen under one
        // lock so a concurrent stop cannot slip in between.
        let (text, started) = {
            let mut state = inner.lock();
            if !inner.is_current(epoch) {
                return Step::Superseded;
            }
            let Some((clip, text)) = state.store.begin_playing(index) else {
                drop(state);
                inner.emit(epoch, LifecycleEvent::ChunkEnd(index));
                return Step::Skipped;
            };
            state.is_playing = true;
            let started = state.output.play(inner.sink.as_ref(), clip);
            (text, started)
        };

        inner.emit(epoch, LifecycleEvent::ChunkStart(index, &text));

        let prefetcher = inner.clone();
        tokio::spawn(async move { prefetcher.prefetch(epoch, index + 1).await });

        match started {
            Ok(handle) => Step::Playing(handle),
            Err(e) => {
                log::error!("Failed to play chunk {}: {}", index, e);
                self.settle(false);
                inner.emit(epoch, LifecycleEvent::ChunkEnd(index));
                Step::Skipped
            }
        }
    }

    /// Wait for the playing chunk to end, then advance the cursor.
    /// Returns `false` once the epoch has been superseded.
    async fn complete(&mut self, handle: PlaybackHandle) -> bool {
        let inner = self.inner.clone();
        let (epoch, index) = (self.epoch, self.index);

        let result = tokio::select! {
            result = handle.finished() => result,
            _ = inner.superseded(epoch) => return false,
        };
        if !inner.is_current(epoch) {
            return false;
        }
        if let Err(e) = &result {
            log::error!("Error playing chunk {}: {}", index, e);
        }
        self.settle(result.is_ok());
        inner.emit(epoch, LifecycleEvent::ChunkEnd(index));

        // Move the cursor before the next chunk is confirmed ready so text
        // display stays in step with the audio.
        let mut state = inner.lock();
        if !inner.is_current(epoch) {
            return false;
        }
        state.store.set_cursor(index + 1);
        true
    }

    fn settle(&self, succeeded: bool) {
        let mut state = self.inner.lock();
        if self.inner.is_current(self.epoch) {
            state.store.finish_playing(self.index, succeeded);
        }
    }
}
