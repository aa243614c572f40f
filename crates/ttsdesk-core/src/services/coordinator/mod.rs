//! Synthesis coordinator.
//!
//! Drives the process supervisor, the synthesis client, playback and the
//! audio store from a single task. Callers talk to it through a cloneable
//! [`CoordinatorHandle`] and observe its state through a watch channel.
//!
//! # Server phases
//!
//! ```text
//! Off --start--> Starting --healthy probe--> On
//!  ^                |                         |
//!  +--timeout/exit--+<-------stop/crash-------+
//! ```
//!
//! Every start, stop, restart and crash bumps an epoch. Background results
//! are tagged with the epoch they were issued under and dropped when it no
//! longer matches, so a probe that completes after `stop_server` cannot
//! mark the server running again.

mod actor;
mod command;
mod state;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{HistoryPolicy, PlaybackSnapshot};
use crate::events::SupervisorEventReceiver;
use crate::ports::{AudioPlaybackPort, AudioStorePort, ProcessSupervisorPort, SynthesisClientPort};
use crate::settings::Settings;

use actor::{Coordinator, reply_channel};
use command::{Command, TransportCommand};

pub use state::{CoordinatorState, ServerPhase};

/// Errors returned by [`CoordinatorHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The coordinator task has exited.
    #[error("Coordinator has shut down")]
    Closed,

    /// An awaited command finished unsuccessfully.
    #[error("{0}")]
    Failed(String),
}

/// Infrastructure the coordinator drives.
#[derive(Clone)]
pub struct CoordinatorDeps {
    pub supervisor: Arc<dyn ProcessSupervisorPort>,
    pub client: Arc<dyn SynthesisClientPort>,
    pub playback: Arc<dyn AudioPlaybackPort>,
    pub store: Arc<dyn AudioStorePort>,
}

/// Cloneable front door to the coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<CoordinatorState>,
    playback: watch::Receiver<PlaybackSnapshot>,
    task: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

/// Spawn the coordinator task on the current runtime.
///
/// `events` is the receiving half of the channel the process supervisor
/// publishes on. When `settings.auto_start_server` is set the server is
/// started immediately.
pub fn spawn_coordinator(
    settings: Arc<Settings>,
    deps: CoordinatorDeps,
    events: SupervisorEventReceiver,
) -> CoordinatorHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(CoordinatorState::from_settings(&settings));
    let playback = deps.playback.subscribe();

    let coordinator = Coordinator::new(settings, deps, state_tx, outcome_tx);
    let task = tokio::spawn(coordinator.run(command_rx, events, outcome_rx));

    CoordinatorHandle {
        commands: command_tx,
        state: state_rx,
        playback,
        task: Arc::new(std::sync::Mutex::new(Some(task))),
    }
}

impl CoordinatorHandle {
    fn send(&self, command: Command) -> Result<(), CoordinatorError> {
        self.commands
            .send(command)
            .map_err(|_| CoordinatorError::Closed)
    }

    async fn send_and_wait(
        &self,
        build: impl FnOnce(command::Reply) -> Command,
    ) -> Result<(), CoordinatorError> {
        let (reply, done) = reply_channel();
        self.send(build(reply))?;
        done.await.map_err(|_| CoordinatorError::Closed)?
    }

    /// Current state snapshot.
    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.clone()
    }

    /// Receiver for playback transport snapshots.
    pub fn playback_updates(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.playback.clone()
    }

    // Input and selection

    pub fn set_input_text(&self, text: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SetInputText(text.into()))
    }

    /// Select a model. Voice-clone models switch voice cloning on.
    pub fn select_model(&self, model: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SelectModel(model.into()))
    }

    pub fn select_speaker(&self, speaker: Option<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SelectSpeaker(speaker))
    }

    pub fn select_language(&self, language: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SelectLanguage(language.into()))
    }

    /// Set the speed multiplier, clamped to `[0.5, 2.0]`.
    pub fn set_speed(&self, speed: f32) -> Result<(), CoordinatorError> {
        self.send(Command::SetSpeed(speed))
    }

    pub fn set_voice_cloning(&self, enabled: bool) -> Result<(), CoordinatorError> {
        self.send(Command::SetVoiceCloning(enabled))
    }

    pub fn set_reference_audio(&self, path: impl Into<PathBuf>) -> Result<(), CoordinatorError> {
        self.send(Command::SetReferenceAudio(path.into()))
    }

    /// Forget the reference recording and switch voice cloning off.
    pub fn clear_reference_audio(&self) -> Result<(), CoordinatorError> {
        self.send(Command::ClearReferenceAudio)
    }

    /// Change retention for future syntheses. Existing items are untouched.
    pub fn set_history_policy(&self, policy: HistoryPolicy) -> Result<(), CoordinatorError> {
        self.send(Command::SetHistoryPolicy(policy))
    }

    // Server lifecycle

    /// Start the server with `model` (or the selected model).
    pub fn start_server(&self, model: Option<String>) -> Result<(), CoordinatorError> {
        self.send(Command::StartServer { model, reply: None })
    }

    /// Start the server and wait until it is healthy or startup fails.
    pub async fn start_server_and_wait(
        &self,
        model: Option<String>,
    ) -> Result<(), CoordinatorError> {
        self.send_and_wait(|reply| Command::StartServer {
            model,
            reply: Some(reply),
        })
        .await
    }

    /// Stop, pause briefly, and start again with `model`.
    pub fn restart_server(&self, model: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::RestartServer(model.into()))
    }

    pub fn stop_server(&self) -> Result<(), CoordinatorError> {
        self.send(Command::StopServer)
    }

    /// Probe the server once and update the running flag.
    pub fn check_server_status(&self) -> Result<(), CoordinatorError> {
        self.send(Command::CheckServerStatus)
    }

    /// Reload models, speakers and languages.
    pub fn refresh_catalog(&self) -> Result<(), CoordinatorError> {
        self.send(Command::RefreshCatalog)
    }

    // Synthesis and audio

    pub fn synthesize(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Synthesize(None))
    }

    /// Synthesize and wait for the result to be played (or to fail).
    pub async fn synthesize_and_wait(&self) -> Result<(), CoordinatorError> {
        self.send_and_wait(|reply| Command::Synthesize(Some(reply)))
            .await
    }

    pub fn play_history_item(&self, id: Uuid) -> Result<(), CoordinatorError> {
        self.send(Command::PlayHistoryItem(id))
    }

    pub fn save_audio(&self, filename: Option<String>) -> Result<(), CoordinatorError> {
        self.send(Command::SaveAudio {
            filename,
            reply: None,
        })
    }

    /// Save the last synthesized audio and return where it was written.
    pub async fn save_audio_and_wait(
        &self,
        filename: Option<String>,
    ) -> Result<PathBuf, CoordinatorError> {
        self.send_and_wait(|reply| Command::SaveAudio {
            filename,
            reply: Some(reply),
        })
        .await?;
        self.state
            .borrow()
            .last_saved
            .clone()
            .ok_or_else(|| CoordinatorError::Failed("No audio saved".to_string()))
    }

    pub fn clear_history(&self) -> Result<(), CoordinatorError> {
        self.send(Command::ClearHistory)
    }

    pub fn clear_logs(&self) -> Result<(), CoordinatorError> {
        self.send(Command::ClearLogs)
    }

    pub fn dismiss_error(&self) -> Result<(), CoordinatorError> {
        self.send(Command::DismissError)
    }

    pub fn pause_playback(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Transport(TransportCommand::Pause))
    }

    pub fn resume_playback(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Transport(TransportCommand::Resume))
    }

    pub fn stop_playback(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Transport(TransportCommand::Stop))
    }

    pub fn seek_playback(&self, position: Duration) -> Result<(), CoordinatorError> {
        self.send(Command::Transport(TransportCommand::Seek(position)))
    }

    pub fn seek_playback_fraction(&self, fraction: f64) -> Result<(), CoordinatorError> {
        self.send(Command::Transport(TransportCommand::SeekFraction(fraction)))
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&CoordinatorState) -> bool,
    ) -> Result<CoordinatorState, CoordinatorError> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Stop the server and end the coordinator task.
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Shutdown(done_tx))?;
        done_rx.await.map_err(|_| CoordinatorError::Closed)?;

        let task = self
            .task
            .lock()
            .map_err(|_| CoordinatorError::Closed)?
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }
        Ok(())
    }
}
