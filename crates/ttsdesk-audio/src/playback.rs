//! Dedicated audio thread behind a `Send + Sync` handle.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the engine lives on
//! one OS thread for its whole lifetime. [`AudioPlayback`] forwards commands
//! over a channel and observes the transport through a `watch` channel that
//! the thread refreshes every [`TICK_INTERVAL`] while playing.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use ttsdesk_core::{AudioPlaybackPort, PlaybackError, PlaybackSnapshot, PlaybackState};

use crate::decode::{DecodedAudio, decode_bytes};
use crate::engine::{PlaybackEngine, RodioEngine};
use crate::error::AudioError;
use crate::transport::Transport;

/// Position refresh rate while playing.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

// ── Commands ───────────────────────────────────────────────────────

enum PlaybackCommand {
    Play {
        audio: DecodedAudio,
        reply: mpsc::Sender<Result<Duration, AudioError>>,
    },
    Pause,
    Resume,
    Stop,
    Seek(Duration),
    SeekFraction(f64),
    Shutdown,
}

// ── Handle ─────────────────────────────────────────────────────────

/// Handle to the audio thread.
///
/// Dropping the handle stops playback and joins the thread.
pub struct AudioPlayback {
    cmd_tx: mpsc::Sender<PlaybackCommand>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioPlayback {
    /// Spawn the audio thread on the default output device.
    pub fn spawn() -> Result<Self, AudioError> {
        Self::spawn_with(RodioEngine::new)
    }

    /// Spawn the audio thread with an engine built by `make_engine` on that
    /// thread. Construction errors are returned here.
    pub fn spawn_with<E, F>(make_engine: F) -> Result<Self, AudioError>
    where
        E: PlaybackEngine + 'static,
        F: FnOnce() -> Result<E, AudioError> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (init_tx, init_rx) = mpsc::channel();
        let (snapshot_tx, snapshots) = watch::channel(PlaybackSnapshot::default());

        let thread = thread::Builder::new()
            .name("ttsdesk-audio".into())
            .spawn(move || {
                let engine = match make_engine() {
                    Ok(engine) => engine,
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                if init_tx.send(Ok(())).is_err() {
                    return;
                }
                run(Transport::new(engine), &cmd_rx, &snapshot_tx);
            })
            .map_err(|e| AudioError::OutputStream(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| AudioError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            snapshots,
            thread: Some(thread),
        })
    }

    /// Decode and play an in-memory audio file. Returns its duration.
    pub fn play_bytes(&self, audio: Bytes) -> Result<Duration, AudioError> {
        let decoded = decode_bytes(audio)?;
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(PlaybackCommand::Play {
                audio: decoded,
                reply,
            })
            .map_err(|_| AudioError::AudioThreadDied)?;
        rx.recv().map_err(|_| AudioError::AudioThreadDied)?
    }

    /// Read, decode and play an audio file from disk.
    pub fn play_file(&self, path: &Path) -> Result<Duration, AudioError> {
        let data = std::fs::read(path)?;
        self.play_bytes(Bytes::from(data))
    }

    fn send(&self, command: PlaybackCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracing::warn!("audio thread is gone, command dropped");
        }
    }
}

impl AudioPlaybackPort for AudioPlayback {
    fn play(&self, audio: Bytes) -> Result<Duration, PlaybackError> {
        self.play_bytes(audio).map_err(PlaybackError::from)
    }

    fn pause(&self) {
        self.send(PlaybackCommand::Pause);
    }

    fn resume(&self) {
        self.send(PlaybackCommand::Resume);
    }

    fn stop(&self) {
        self.send(PlaybackCommand::Stop);
    }

    fn seek(&self, position: Duration) {
        self.send(PlaybackCommand::Seek(position));
    }

    fn seek_fraction(&self, fraction: f64) {
        self.send(PlaybackCommand::SeekFraction(fraction));
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        *self.snapshots.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlaybackCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

// ── Audio thread event loop ────────────────────────────────────────

fn run<E: PlaybackEngine>(
    mut transport: Transport<E>,
    cmd_rx: &mpsc::Receiver<PlaybackCommand>,
    snapshot_tx: &watch::Sender<PlaybackSnapshot>,
) {
    loop {
        let command = if transport.state() == PlaybackState::Playing {
            match cmd_rx.recv_timeout(TICK_INTERVAL) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match cmd_rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(PlaybackCommand::Play { audio, reply }) => {
                let result = transport.load_and_play(audio);
                // Observers see the new item before the caller returns
                publish(snapshot_tx, transport.snapshot());
                let _ = reply.send(result);
            }
            Some(PlaybackCommand::Pause) => transport.pause(),
            Some(PlaybackCommand::Resume) => transport.resume(),
            Some(PlaybackCommand::Stop) => transport.stop(),
            Some(PlaybackCommand::Seek(position)) => transport.seek(position),
            Some(PlaybackCommand::SeekFraction(fraction)) => transport.seek_fraction(fraction),
            Some(PlaybackCommand::Shutdown) => break,
            None => {}
        }

        transport.tick();
        publish(snapshot_tx, transport.snapshot());
    }

    transport.stop();
    publish(snapshot_tx, transport.snapshot());
    tracing::debug!("Audio thread shutting down");
}

fn publish(tx: &watch::Sender<PlaybackSnapshot>, snapshot: PlaybackSnapshot) {
    tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
