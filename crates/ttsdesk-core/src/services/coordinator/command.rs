//! Messages flowing into the coordinator loop.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::HistoryPolicy;
use crate::ports::{StorageError, SynthesisError};

use super::CoordinatorError;

/// Completion signal for commands a caller may await.
pub(super) type Reply = oneshot::Sender<Result<(), CoordinatorError>>;

/// Commands issued through `CoordinatorHandle`.
pub(super) enum Command {
    SetInputText(String),
    SelectModel(String),
    SelectSpeaker(Option<String>),
    SelectLanguage(String),
    SetSpeed(f32),
    SetVoiceCloning(bool),
    SetReferenceAudio(PathBuf),
    ClearReferenceAudio,
    SetHistoryPolicy(HistoryPolicy),

    StartServer {
        model: Option<String>,
        reply: Option<Reply>,
    },
    RestartServer(String),
    StopServer,
    CheckServerStatus,
    RefreshCatalog,

    Synthesize(Option<Reply>),
    PlayHistoryItem(Uuid),
    SaveAudio {
        filename: Option<String>,
        reply: Option<Reply>,
    },
    ClearHistory,
    ClearLogs,
    DismissError,

    Transport(TransportCommand),

    Shutdown(oneshot::Sender<()>),
}

/// Playback pass-through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum TransportCommand {
    Pause,
    Resume,
    Stop,
    Seek(Duration),
    SeekFraction(f64),
}

/// How the startup readiness loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Readiness {
    Healthy,
    TimedOut,
    /// The process disappeared before answering.
    Exited,
}

/// Results of background work, reported back to the loop.
///
/// Server-scoped outcomes carry the epoch they were issued under and are
/// dropped if the server has since been stopped, restarted or has crashed.
pub(super) enum TaskOutcome {
    Startup {
        epoch: u64,
        readiness: Readiness,
    },
    StatusProbe {
        epoch: u64,
        healthy: bool,
    },
    Catalog {
        epoch: u64,
        models: Result<Vec<String>, SynthesisError>,
        speakers: Vec<String>,
        languages: Vec<String>,
    },
    RestartReady {
        epoch: u64,
        model: String,
    },
    Synthesized {
        text: String,
        model: String,
        result: Result<Bytes, SynthesisError>,
    },
    Saved {
        result: Result<PathBuf, StorageError>,
        reply: Option<Reply>,
    },
}
