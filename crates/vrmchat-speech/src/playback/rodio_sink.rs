use super::{AudioSink, PlaybackHandle};
use crate::AudioClip;
use crate::error::{PlaybackError, PlaybackResult};
use bytes::Bytes;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use tokio::sync::oneshot;

const POLL_INTERVAL: Duration = Duration::from_millis(15);

enum Command {
    Play {
        data: Bytes,
        done: oneshot::Sender<PlaybackResult<()>>,
    },
    Halt,
}

/// Speaker output through the default audio device.
///
/// The rodio stream lives on a dedicated thread; this handle only sends it
/// commands, so it can be shared freely between tasks.
pub struct RodioSink {
    commands: mpsc::Sender<Command>,
}

impl RodioSink {
    /// Open the default output device
    pub fn try_new() -> PlaybackResult<Self> {
        let (commands, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("vrmchat-audio".to_string())
            .spawn(move || {
                let stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlaybackError::InitFailed(e.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                run_output(stream, rx);
            })
            .map_err(|e| PlaybackError::InitFailed(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| PlaybackError::InitFailed("audio thread exited".to_string()))??;

        Ok(Self { commands })
    }
}

impl AudioSink for RodioSink {
    fn start(&self, clip: &AudioClip) -> PlaybackResult<PlaybackHandle> {
        let (done, handle) = PlaybackHandle::channel();
        self.commands
            .send(Command::Play {
                data: clip.data.clone(),
                done,
            })
            .map_err(|_| PlaybackError::Closed)?;
        Ok(handle)
    }

    fn halt(&self) {
        let _ = self.commands.send(Command::Halt);
    }
}

fn run_output(stream: OutputStream, commands: mpsc::Receiver<Command>) {
    let mut sink = Sink::connect_new(stream.mixer());
    let mut pending: Option<oneshot::Sender<PlaybackResult<()>>> = None;

    loop {
        match commands.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Play { data, done }) => {
                if pending.take().is_some() || !sink.empty() {
                    sink.stop();
                    sink = Sink::connect_new(stream.mixer());
                }
                let len = data.len();
                match Decoder::new(Cursor::new(data)) {
                    Ok(source) => {
                        sink.append(source);
                        pending = Some(done);
                    }
                    Err(e) => {
                        log::error!("Failed to decode clip of {} bytes: {}", len, e);
                        let _ = done.send(Err(PlaybackError::Decode(len, e.to_string())));
                    }
                }
            }
            Ok(Command::Halt) => {
                sink.stop();
                sink = Sink::connect_new(stream.mixer());
                pending = None;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if sink.empty() {
            if let Some(done) = pending.take() {
                let _ = done.send(Ok(()));
            }
        }
    }
}
