//! End-to-end flow through the public coordinator API.
//!
//! Stub adapters stand in for the process, the HTTP server and the audio
//! device. Everything answers instantly, so the tests exercise ordering and
//! state publication rather than timing.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;
use ttsdesk_core::events::supervisor_channel;
use ttsdesk_core::{
    AudioPlaybackPort, AudioStorePort, CoordinatorDeps, CoordinatorState, PlaybackError,
    PlaybackSnapshot, ProcessError, ProcessSupervisorPort, ServerLaunch, ServerPhase,
    ServerProcessState, Settings, StorageError, SynthesisClientPort, SynthesisError,
    SynthesisRequest, SupervisorEvent, VoiceCloneRequest, spawn_coordinator,
};

// ── Stub adapters ──────────────────────────────────────────────────

#[derive(Default)]
struct StubSupervisor {
    state: Mutex<ServerProcessState>,
}

#[async_trait]
impl ProcessSupervisorPort for StubSupervisor {
    async fn start(&self, launch: ServerLaunch) -> Result<(), ProcessError> {
        *self.state.lock().unwrap() = ServerProcessState::Running {
            model: launch.model,
            port: launch.port,
        };
        Ok(())
    }

    async fn stop(&self) {
        *self.state.lock().unwrap() = ServerProcessState::NotStarted;
    }

    async fn restart(&self, _model: Option<String>) -> Result<(), ProcessError> {
        Err(ProcessError::NeverStarted)
    }

    fn state(&self) -> ServerProcessState {
        self.state.lock().unwrap().clone()
    }
}

/// Echoes the request text back as the "audio".
struct EchoServer;

#[async_trait]
impl SynthesisClientPort for EchoServer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, SynthesisError> {
        Ok(Bytes::from(request.text.into_bytes()))
    }

    async fn synthesize_with_voice_clone(
        &self,
        _request: VoiceCloneRequest,
    ) -> Result<Bytes, SynthesisError> {
        Err(SynthesisError::ServerError("cloning disabled".to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>, SynthesisError> {
        Ok(vec!["A".to_string()])
    }

    async fn list_speakers(&self) -> Vec<String> {
        Vec::new()
    }

    async fn list_languages(&self) -> Vec<String> {
        vec!["en".to_string()]
    }

    async fn check_health(&self) -> bool {
        true
    }
}

struct StubSpeaker {
    played: Mutex<Vec<Bytes>>,
    snapshots: watch::Sender<PlaybackSnapshot>,
}

impl AudioPlaybackPort for StubSpeaker {
    fn play(&self, audio: Bytes) -> Result<Duration, PlaybackError> {
        self.played.lock().unwrap().push(audio);
        Ok(Duration::from_millis(1500))
    }

    fn pause(&self) {}

    fn resume(&self) {}

    fn stop(&self) {}

    fn seek(&self, _position: Duration) {}

    fn seek_fraction(&self, _fraction: f64) {}

    fn snapshot(&self) -> PlaybackSnapshot {
        *self.snapshots.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.subscribe()
    }
}

struct NullStore;

#[async_trait]
impl AudioStorePort for NullStore {
    async fn save_audio(
        &self,
        _audio: Bytes,
        filename: Option<String>,
    ) -> Result<PathBuf, StorageError> {
        Err(StorageError::InvalidFilename(filename.unwrap_or_default()))
    }
}

fn settings() -> Settings {
    Settings {
        probe_interval_ms: 5,
        restart_settle_ms: 5,
        ..Settings::default()
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn start_synthesize_and_play() {
    let speaker = Arc::new(StubSpeaker {
        played: Mutex::new(Vec::new()),
        snapshots: watch::channel(PlaybackSnapshot::default()).0,
    });
    let deps = CoordinatorDeps {
        supervisor: Arc::new(StubSupervisor::default()),
        client: Arc::new(EchoServer),
        playback: speaker.clone(),
        store: Arc::new(NullStore),
    };
    let (events, events_rx) = supervisor_channel();
    let handle = spawn_coordinator(Arc::new(settings()), deps, events_rx);

    handle
        .start_server_and_wait(Some("A".to_string()))
        .await
        .unwrap();
    assert!(handle.state().is_server_running());

    handle.set_input_text("hello").unwrap();
    handle.synthesize_and_wait().await.unwrap();

    let state: CoordinatorState = handle.state();
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history.items()[0].text, "hello");
    assert_eq!(state.history.items()[0].model, "A");
    assert_eq!(speaker.played.lock().unwrap()[0], Bytes::from_static(b"hello"));

    // storage failures are surfaced, not fatal
    let err = handle
        .save_audio_and_wait(Some("x".to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to save audio"));

    drop(events);
    handle.stop_server().unwrap();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        handle.wait_for(|s| s.phase == ServerPhase::Off),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(state.models.is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn supervisor_logs_are_buffered() {
    let deps = CoordinatorDeps {
        supervisor: Arc::new(StubSupervisor::default()),
        client: Arc::new(EchoServer),
        playback: Arc::new(StubSpeaker {
            played: Mutex::new(Vec::new()),
            snapshots: watch::channel(PlaybackSnapshot::default()).0,
        }),
        store: Arc::new(NullStore),
    };
    let (events, events_rx) = supervisor_channel();
    let handle = spawn_coordinator(Arc::new(settings()), deps, events_rx);

    for n in 0..1001 {
        events
            .send(SupervisorEvent::Log(ttsdesk_core::LogLine::supervisor(
                n.to_string(),
            )))
            .unwrap();
    }
    // one batch eviction at line 1001
    events
        .send(SupervisorEvent::Log(ttsdesk_core::LogLine::supervisor("end")))
        .unwrap();

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        handle.wait_for(|s| s.logs.lines().last().is_some_and(|l| l.text == "end")),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(state.logs.len(), 902);
    assert_eq!(state.logs.lines()[0].text, "100");
}
