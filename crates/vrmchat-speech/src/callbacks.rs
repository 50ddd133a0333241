use std::sync::{Arc, PoisonError, RwLock};

pub type ChunkStartCallback = Arc<dyn Fn(usize, &str) + Send + Sync>;
pub type ChunkEndCallback = Arc<dyn Fn(usize) + Send + Sync>;
pub type AllCompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle notifications fanned out to UI consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent<'a> {
    ChunkStart(usize, &'a str),
    ChunkEnd(usize),
    AllComplete,
}

/// Single-slot registrations; the last one set wins.
#[derive(Default)]
pub(crate) struct Callbacks {
    chunk_start: RwLock<Option<ChunkStartCallback>>,
    chunk_end: RwLock<Option<ChunkEndCallback>>,
    all_complete: RwLock<Option<AllCompleteCallback>>,
}

fn replace<T>(slot: &RwLock<Option<T>>, value: Option<T>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = value;
}

fn current<T: Clone>(slot: &RwLock<Option<T>>) -> Option<T> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

impl Callbacks {
    pub(crate) fn set_chunk_start(&self, callback: Option<ChunkStartCallback>) {
        replace(&self.chunk_start, callback);
    }

    pub(crate) fn set_chunk_end(&self, callback: Option<ChunkEndCallback>) {
        replace(&self.chunk_end, callback);
    }

    pub(crate) fn set_all_complete(&self, callback: Option<AllCompleteCallback>) {
        replace(&self.all_complete, callback);
    }

    /// Invoke the registered callback for `event`.
    ///
    /// The registration is cloned out first, so a callback may replace
    /// registrations while it runs.
    pub(crate) fn invoke(&self, event: LifecycleEvent<'_>) {
        match event {
            LifecycleEvent::ChunkStart(index, text) => {
                if let Some(callback) = current(&self.chunk_start) {
                    callback(index, text);
                }
            }
            LifecycleEvent::ChunkEnd(index) => {
                if let Some(callback) = current(&self.chunk_end) {
                    callback(index);
                }
            }
            LifecycleEvent::AllComplete => {
                if let Some(callback) = current(&self.all_complete) {
                    callback();
                }
            }
        }
    }
}
