//! Public entry point: one utterance at a time, each new one superseding the last.

use crate::callbacks::{Callbacks, LifecycleEvent};
use crate::config::ChunkedTTSConfig;
use crate::error::ConfigError;
use crate::playback::{AudioOutput, AudioSink};
use crate::prefetch::PendingFetch;
use crate::provider::TTSSpeechProvider;
use crate::sequencer::Sequencer;
use crate::store::ChunkStore;
use crate::types::{ChunkSnapshot, PipelineSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Mutable state of the current utterance, guarded by one mutex.
///
/// Epoch bumps happen while this lock is held, so a task that checks the
/// epoch under the lock and then mutates the store cannot interleave with a
/// cancellation.
#[derive(Default)]
pub(crate) struct SessionState {
    pub(crate) store: ChunkStore,
    pub(crate) pending: HashMap<usize, PendingFetch>,
    pub(crate) output: AudioOutput,
    pub(crate) is_loading: bool,
    pub(crate) is_playing: bool,
}

pub(crate) struct Inner {
    pub(crate) provider: Arc<dyn TTSSpeechProvider>,
    pub(crate) sink: Arc<dyn AudioSink>,
    pub(crate) config: ChunkedTTSConfig,
    state: Mutex<SessionState>,
    epoch: watch::Sender<u64>,
    callbacks: Callbacks,
    dispatch: Mutex<()>,
}

impl Inner {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        *self.epoch.borrow() == epoch
    }

    /// Start a new generation. Callers must hold the state lock.
    fn bump_epoch(&self, _state: &mut SessionState) -> u64 {
        self.epoch.send_modify(|epoch| *epoch += 1);
        *self.epoch.borrow()
    }

    /// Resolves once `epoch` has been superseded
    pub(crate) async fn superseded(&self, epoch: u64) {
        let mut rx = self.epoch.subscribe();
        let _ = rx.wait_for(|current| *current != epoch).await;
    }

    /// Fire a lifecycle callback on behalf of `epoch`.
    ///
    /// Emissions are serialized, and a superseded epoch emits nothing, so a
    /// cancelled run can never notify after its successor has.
    pub(crate) fn emit(&self, epoch: u64, event: LifecycleEvent<'_>) {
        let _gate = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(epoch) {
            log::debug!("Dropping {:?} from superseded epoch {}", event, epoch);
            return;
        }
        self.callbacks.invoke(event);
    }
}

/// Chunked text-to-speech session.
///
/// Splits a response into punctuation-delimited chunks, synthesizes them
/// through a [`TTSSpeechProvider`] while prefetching ahead of the playback
/// cursor, and plays them back one at a time on an [`AudioSink`]. Starting a
/// new utterance atomically cancels the previous one.
///
/// Cloning is cheap; every clone drives the same session.
#[derive(Clone)]
pub struct ChunkedTTS {
    inner: Arc<Inner>,
}

impl ChunkedTTS {
    pub fn new(
        provider: Arc<dyn TTSSpeechProvider>,
        sink: Arc<dyn AudioSink>,
        config: ChunkedTTSConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (epoch, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                provider,
                sink,
                config,
                state: Mutex::new(SessionState::default()),
                epoch,
                callbacks: Callbacks::default(),
                dispatch: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &ChunkedTTSConfig {
        &self.inner.config
    }

    /// Speak `text`, superseding any utterance in progress.
    ///
    /// Returns once the first chunk has been handed to the sink, or after
    /// `on_all_complete` fired because there was nothing playable. Playback
    /// of the remaining chunks continues on a background task.
    pub async fn start_synthesis(&self, text: &str) {
        let inner = &self.inner;
        let texts = inner.config.segmentation.split(text);

        let (epoch, chunk_count) = {
            let mut state = inner.lock();
            let epoch = inner.bump_epoch(&mut state);
            inner.sink.halt();
            state.output.release();
            state.pending.clear();
            state.store = ChunkStore::new(texts);
            state.is_playing = false;
            state.is_loading = !state.store.is_empty();
            (epoch, state.store.len())
        };

        if chunk_count == 0 {
            log::debug!("Nothing to speak in utterance {}", epoch);
            inner.emit(epoch, LifecycleEvent::AllComplete);
            return;
        }
        log::debug!("Starting utterance {} with {} chunks", epoch, chunk_count);

        let first_ready = tokio::select! {
            ready = inner.fetch_chunk(epoch, 0) => ready,
            _ = inner.superseded(epoch) => return,
        };

        {
            let mut state = inner.lock();
            if !inner.is_current(epoch) {
                return;
            }
            state.is_loading = false;
            state.is_playing = first_ready;
        }

        if !first_ready {
            log::error!("Failed to synthesize the first chunk of utterance {}", epoch);
            inner.emit(epoch, LifecycleEvent::AllComplete);
            return;
        }

        let mut sequencer = Sequencer::new(inner.clone(), epoch);
        let step = sequencer.start_current().await;
        tokio::spawn(sequencer.run(step));
    }

    /// Halt playback, release the assigned clip and abandon the current
    /// utterance. Idempotent.
    pub fn stop(&self) {
        let inner = &self.inner;
        let mut state = inner.lock();
        if !state.is_playing && !state.is_loading && state.pending.is_empty() {
            return;
        }
        let epoch = inner.bump_epoch(&mut state);
        log::debug!("Stopped; now at epoch {}", epoch);
        inner.sink.halt();
        state.output.release();
        state.pending.clear();
        state.store.clear_cursor();
        state.is_playing = false;
        state.is_loading = false;
    }

    /// Synthesize the pending chunks in the prefetch window starting at
    /// `from`. Returns when every fetch issued for the window has settled.
    pub async fn prefetch(&self, from: usize) {
        let epoch = *self.inner.epoch.borrow();
        self.inner.prefetch(epoch, from).await;
    }

    /// Register the callback fired when a chunk starts playing
    pub fn on_chunk_start<F>(&self, callback: F)
    where
        F: Fn(usize, &str) + Send + Sync + 'static,
    {
        self.inner.callbacks.set_chunk_start(Some(Arc::new(callback)));
    }

    /// Register the callback fired when a chunk finishes or is skipped
    pub fn on_chunk_end<F>(&self, callback: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.inner.callbacks.set_chunk_end(Some(Arc::new(callback)));
    }

    /// Register the callback fired once an utterance has run to its end
    pub fn on_all_complete<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.set_all_complete(Some(Arc::new(callback)));
    }

    pub fn clear_callbacks(&self) {
        self.inner.callbacks.set_chunk_start(None);
        self.inner.callbacks.set_chunk_end(None);
        self.inner.callbacks.set_all_complete(None);
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let state = self.inner.lock();
        PipelineSnapshot {
            chunks: state.store.snapshots(),
            current_index: state.store.current_index(),
            is_loading: state.is_loading,
            is_playing: state.is_playing,
        }
    }

    pub fn chunks(&self) -> Vec<ChunkSnapshot> {
        self.inner.lock().store.snapshots()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.lock().store.current_index()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().is_playing
    }

    /// Text of the chunks before the cursor, i.e. what has been fully spoken
    pub fn spoken_text(&self) -> String {
        self.inner.lock().store.spoken_text()
    }
}
