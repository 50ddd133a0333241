#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use vrmchat_speech::{
    AudioClip, AudioSink, ChunkedTTS, ChunkedTTSConfig, PlaybackError, PlaybackHandle,
    PlaybackResult, SpeechRequest, TTSError, TTSResult, TTSSpeechProvider, Voice,
};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// How the mock engine answers for a given chunk text
#[derive(Clone, Copy, Debug)]
pub enum Reply {
    Audio,
    Empty,
    Fail,
    Panic,
    Hang,
}

/// Synthesis engine double that counts calls per chunk text
pub struct MockProvider {
    replies: HashMap<String, Reply>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    gate: watch::Sender<bool>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            replies: HashMap::new(),
            delay: Duration::ZERO,
            delays: HashMap::new(),
            gate,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, text: &str, reply: Reply) -> Self {
        self.replies.insert(text.to_string(), reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay only the calls for `text`
    pub fn with_delay_for(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    /// Hold every call until [`MockProvider::open`] is called
    pub fn gated(self) -> Self {
        self.gate.send_replace(false);
        self
    }

    pub fn open(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls.lock().unwrap().get(text).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TTSSpeechProvider for MockProvider {
    async fn synthesize(&self, request: SpeechRequest) -> TTSResult<Option<AudioClip>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.text.clone())
            .or_default() += 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        let delay = self
            .delays
            .get(&request.text)
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .get(&request.text)
            .copied()
            .unwrap_or(Reply::Audio);
        let result = match reply {
            Reply::Audio => Ok(Some(AudioClip::wav(request.text.clone().into_bytes()))),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(TTSError::GenerationFailed(
                "scripted failure".to_string(),
                request.text.chars().count(),
            )),
            Reply::Panic => panic!("engine crashed on {}", request.text),
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Output device double: every clip "plays" for a fixed duration
pub struct MockSink {
    clip_duration: Duration,
    generation: Arc<AtomicU64>,
    current: Arc<Mutex<Option<(u64, tokio::sync::oneshot::Sender<PlaybackResult<()>>)>>>,
    started: Mutex<Vec<String>>,
    halts: AtomicUsize,
    reject: HashSet<String>,
}

impl MockSink {
    pub fn new(clip_duration: Duration) -> Self {
        Self {
            clip_duration,
            generation: Arc::new(AtomicU64::new(0)),
            current: Arc::new(Mutex::new(None)),
            started: Mutex::new(Vec::new()),
            halts: AtomicUsize::new(0),
            reject: HashSet::new(),
        }
    }

    /// Refuse to decode the clip synthesized for `text`
    pub fn rejecting(mut self, text: &str) -> Self {
        self.reject.insert(text.to_string());
        self
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn halts(&self) -> usize {
        self.halts.load(Ordering::SeqCst)
    }
}

impl AudioSink for MockSink {
    fn start(&self, clip: &AudioClip) -> PlaybackResult<PlaybackHandle> {
        let text = String::from_utf8_lossy(&clip.data).to_string();
        self.started.lock().unwrap().push(text.clone());
        if self.reject.contains(&text) {
            return Err(PlaybackError::Decode(clip.len(), "unsupported".to_string()));
        }

        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (done, handle) = PlaybackHandle::channel();
        *self.current.lock().unwrap() = Some((id, done));

        let current = self.current.clone();
        let duration = self.clip_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut slot = current.lock().unwrap();
            if slot.as_ref().is_some_and(|(playing, _)| *playing == id) {
                if let Some((_, done)) = slot.take() {
                    let _ = done.send(Ok(()));
                }
            }
        });
        Ok(handle)
    }

    fn halt(&self) {
        self.halts.fetch_add(1, Ordering::SeqCst);
        self.current.lock().unwrap().take();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Start(usize, String),
    End(usize),
    Complete,
}

/// Records every lifecycle callback and signals completion
pub struct Recorder {
    pub events: Arc<Mutex<Vec<Event>>>,
    pub completed: mpsc::UnboundedReceiver<()>,
}

impl Recorder {
    pub fn attach(tts: &ChunkedTTS) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (tx, completed) = mpsc::unbounded_channel();

        let log = events.clone();
        tts.on_chunk_start(move |index, text| {
            log.lock().unwrap().push(Event::Start(index, text.to_string()));
        });
        let log = events.clone();
        tts.on_chunk_end(move |index| {
            log.lock().unwrap().push(Event::End(index));
        });
        let log = events.clone();
        tts.on_all_complete(move || {
            log.lock().unwrap().push(Event::Complete);
            let _ = tx.send(());
        });

        Self { events, completed }
    }

    pub async fn wait_complete(&mut self) {
        tokio::time::timeout(WAIT, self.completed.recv())
            .await
            .expect("utterance did not complete in time")
            .expect("completion channel closed");
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

pub fn start(index: usize, text: &str) -> Event {
    Event::Start(index, text.to_string())
}

pub fn config() -> ChunkedTTSConfig {
    ChunkedTTSConfig::new(Voice::new("3c37646f-3881-5374-2a83-149267990abc", 0))
}

pub fn session(
    provider: Arc<MockProvider>,
    sink: Arc<MockSink>,
    config: ChunkedTTSConfig,
) -> ChunkedTTS {
    ChunkedTTS::new(provider, sink, config).unwrap()
}

/// Poll `condition` until it holds or the wait budget runs out
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
