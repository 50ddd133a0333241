//! Chunk synthesis and look-ahead scheduling.

use crate::error::TTSError;
use crate::session::{Inner, SessionState};
use crate::types::{ChunkStatus, SpeechRequest};
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use std::sync::Arc;

pub(crate) type FetchFuture = Shared<BoxFuture<'static, bool>>;

/// Drop the pending entry for `index` if it was registered by `epoch`
fn release_pending(state: &mut SessionState, epoch: u64, index: usize) {
    if state
        .pending
        .get(&index)
        .is_some_and(|pending| pending.epoch == epoch)
    {
        state.pending.remove(&index);
    }
}

/// An in-flight synthesis call for one chunk index
pub(crate) struct PendingFetch {
    epoch: u64,
    fetch: FetchFuture,
}

enum Acquire {
    Settled(bool),
    InFlight(FetchFuture),
}

impl Inner {
    /// Make chunk `index` ready, resolving to whether it has audio.
    ///
    /// Joins the outstanding call for the index if there is one, so there is
    /// never more than one synthesis request per chunk.
    pub(crate) async fn fetch_chunk(self: &Arc<Self>, epoch: u64, index: usize) -> bool {
        match self.acquire(epoch, index) {
            Acquire::Settled(ready) => ready,
            Acquire::InFlight(fetch) => fetch.await,
        }
    }

    fn acquire(self: &Arc<Self>, epoch: u64, index: usize) -> Acquire {
        let mut state = self.lock();
        if !self.is_current(epoch) {
            return Acquire::Settled(false);
        }
        match state.store.status(index) {
            Some(ChunkStatus::Ready) => return Acquire::Settled(true),
            Some(ChunkStatus::Pending | ChunkStatus::Loading) => {}
            _ => return Acquire::Settled(false),
        }
        if let Some(pending) = state.pending.get(&index) {
            return Acquire::InFlight(pending.fetch.clone());
        }

        let Some(text) = state.store.get(index).map(|c| c.text().to_string()) else {
            return Acquire::Settled(false);
        };
        state.store.mark_loading(index);

        log::debug!("Synthesizing chunk {} ({} chars)", index, text.chars().count());
        let call = tokio::spawn(self.clone().synthesize_chunk(epoch, index, text));
        let inner = self.clone();
        let fetch = async move {
            match call.await {
                Ok(ready) => ready,
                Err(e) => {
                    log::error!("Synthesis task for chunk {} failed: {}", index, e);
                    let mut state = inner.lock();
                    if inner.is_current(epoch) {
                        release_pending(&mut state, epoch, index);
                        state.store.mark_error(index);
                    }
                    false
                }
            }
        }
        .boxed()
        .shared();
        state.pending.insert(
            index,
            PendingFetch {
                epoch,
                fetch: fetch.clone(),
            },
        );
        Acquire::InFlight(fetch)
    }

    /// One synthesis round trip. Results for a superseded epoch are dropped
    /// without touching the store.
    async fn synthesize_chunk(self: Arc<Self>, epoch: u64, index: usize, text: String) -> bool {
        let len = text.chars().count();
        let request = SpeechRequest {
            text,
            voice: self.config.voice.clone(),
        };
        let call = self.provider.synthesize(request);
        let outcome = match self.config.synthesis_timeout() {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(TTSError::Timeout(limit.as_millis() as u64, len))
            }),
            None => call.await,
        };

        let mut state = self.lock();
        if !self.is_current(epoch) {
            log::debug!("Discarding chunk {} from superseded epoch {}", index, epoch);
            return false;
        }
        release_pending(&mut state, epoch, index);

        match outcome {
            Ok(Some(clip)) if !clip.is_empty() => state.store.store_audio(index, clip),
            Ok(_) => {
                log::warn!("Synthesis returned no audio for chunk {}", index);
                state.store.mark_error(index);
                false
            }
            Err(e) => {
                log::error!("Failed to fetch chunk {}: {}", index, e);
                state.store.mark_error(index);
                false
            }
        }
    }

    /// Issue synthesis for every pending chunk in `[from, from + prefetch_count)`
    /// and wait for all of them to settle. Out-of-range windows are a no-op.
    pub(crate) async fn prefetch(self: &Arc<Self>, epoch: u64, from: usize) {
        let window: Vec<usize> = {
            let state = self.lock();
            if !self.is_current(epoch) {
                return;
            }
            let end = from
                .saturating_add(self.config.prefetch_count)
                .min(state.store.len());
            (from..end)
                .filter(|&i| state.store.status(i) == Some(ChunkStatus::Pending))
                .collect()
        };
        if window.is_empty() {
            return;
        }

        log::debug!("Prefetching chunks {:?}", window);
        join_all(window.into_iter().map(|i| self.fetch_chunk(epoch, i))).await;
    }
}
