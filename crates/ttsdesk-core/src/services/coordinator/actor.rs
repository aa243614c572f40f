//! The coordinator task.
//!
//! A single task owns `CoordinatorState` and is the only writer of the watch
//! channel that publishes it. Slow work (readiness probes, HTTP calls, file
//! writes, restart delays) runs in spawned tasks that report back through
//! `TaskOutcome` messages, so the loop never blocks on the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    FALLBACK_LANGUAGES, FALLBACK_MODELS, HistoryItem, ServerLaunch, ServerProcessState,
    SynthesisRequest, VoiceCloneRequest, clamp_speed, is_voice_clone_model,
};
use crate::events::{SupervisorEvent, SupervisorEventReceiver};
use crate::ports::{ProcessError, ProcessSupervisorPort, SynthesisClientPort, ValidationError};
use crate::settings::Settings;

use super::command::{Command, Readiness, Reply, TaskOutcome, TransportCommand};
use super::state::{CoordinatorState, ServerPhase};
use super::{CoordinatorDeps, CoordinatorError};

pub(super) const NOT_RESPONDING: &str =
    "Server started but not responding. Check logs for details.";
pub(super) const EXITED_DURING_STARTUP: &str =
    "Server exited during startup. Check logs for details.";

/// The HTTP call a validated synthesis turns into.
enum SynthesisCall {
    Plain(SynthesisRequest),
    VoiceClone(VoiceCloneRequest),
}

struct PreparedSynthesis {
    text: String,
    model: String,
    call: SynthesisCall,
}

pub(super) struct Coordinator {
    settings: Arc<Settings>,
    deps: CoordinatorDeps,
    state: watch::Sender<CoordinatorState>,
    outcomes: mpsc::UnboundedSender<TaskOutcome>,
    /// Bumped on every start, stop, restart and crash.
    epoch: u64,
    start_waiters: Vec<Reply>,
    synthesis_waiter: Option<Reply>,
}

impl Coordinator {
    pub(super) fn new(
        settings: Arc<Settings>,
        deps: CoordinatorDeps,
        state: watch::Sender<CoordinatorState>,
        outcomes: mpsc::UnboundedSender<TaskOutcome>,
    ) -> Self {
        Self {
            settings,
            deps,
            state,
            outcomes,
            epoch: 0,
            start_waiters: Vec::new(),
            synthesis_waiter: None,
        }
    }

    pub(super) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: SupervisorEventReceiver,
        mut outcomes: mpsc::UnboundedReceiver<TaskOutcome>,
    ) {
        if self.settings.auto_start_server {
            info!("auto-starting TTS server");
            self.start_server(None, None).await;
        }

        let mut events_open = true;
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("all coordinator handles dropped");
                        self.shutdown().await;
                        break;
                    };
                    if let Command::Shutdown(done) = command {
                        self.shutdown().await;
                        let _ = done.send(());
                        break;
                    }
                    self.handle_command(command).await;
                }
                Some(outcome) = outcomes.recv() => self.handle_outcome(outcome).await,
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_supervisor_event(event),
                    None => {
                        debug!("supervisor event channel closed");
                        events_open = false;
                    }
                },
            }
        }
        debug!("coordinator loop finished");
    }

    fn update(&self, modify: impl FnOnce(&mut CoordinatorState)) {
        self.state.send_modify(modify);
    }

    fn phase(&self) -> ServerPhase {
        self.state.borrow().phase
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetInputText(text) => self.update(|s| s.input_text = text),
            Command::SelectModel(model) => self.select_model(model),
            Command::SelectSpeaker(speaker) => {
                self.update(|s| s.selected_speaker = speaker.filter(|v| !v.is_empty()));
            }
            Command::SelectLanguage(language) => self.update(|s| s.selected_language = language),
            Command::SetSpeed(speed) => self.update(|s| s.speed = clamp_speed(speed)),
            Command::SetVoiceCloning(enabled) => self.update(|s| s.voice_cloning = enabled),
            Command::SetReferenceAudio(path) => self.update(|s| s.reference_audio = Some(path)),
            Command::ClearReferenceAudio => self.update(|s| {
                s.reference_audio = None;
                s.voice_cloning = false;
            }),
            Command::SetHistoryPolicy(policy) => self.update(|s| s.history_policy = policy),
            Command::StartServer { model, reply } => self.start_server(model, reply).await,
            Command::RestartServer(model) => self.restart_server(model).await,
            Command::StopServer => self.stop_server().await,
            Command::CheckServerStatus => self.check_server_status(),
            Command::RefreshCatalog => self.refresh_catalog(),
            Command::Synthesize(reply) => self.synthesize(reply),
            Command::PlayHistoryItem(id) => self.play_history_item(id),
            Command::SaveAudio { filename, reply } => self.save_audio(filename, reply),
            Command::ClearHistory => self.update(|s| s.history.clear()),
            Command::ClearLogs => self.update(|s| s.logs.clear()),
            Command::DismissError => self.update(CoordinatorState::clear_error),
            Command::Transport(transport) => self.transport(transport),
            Command::Shutdown(done) => {
                // intercepted by `run`
                let _ = done.send(());
            }
        }
    }

    async fn handle_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Startup { epoch, readiness } => self.on_startup(epoch, readiness),
            TaskOutcome::StatusProbe { epoch, healthy } => self.on_status_probe(epoch, healthy),
            TaskOutcome::Catalog {
                epoch,
                models,
                speakers,
                languages,
            } => self.on_catalog(epoch, models, speakers, languages),
            TaskOutcome::RestartReady { epoch, model } => {
                if epoch != self.epoch {
                    debug!(epoch, current = self.epoch, "restart cancelled");
                    return;
                }
                self.select_model(model);
                self.launch_server().await;
            }
            TaskOutcome::Synthesized {
                text,
                model,
                result,
            } => self.on_synthesized(text, model, result),
            TaskOutcome::Saved { result, reply } => {
                let outcome = match result {
                    Ok(path) => {
                        info!(path = %path.display(), "saved audio");
                        self.update(|s| s.last_saved = Some(path));
                        Ok(())
                    }
                    Err(e) => {
                        let message = format!("Failed to save audio: {e}");
                        warn!(error = %e, "saving audio failed");
                        self.update(|s| s.fail(message.clone()));
                        Err(CoordinatorError::Failed(message))
                    }
                };
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
        }
    }

    fn handle_supervisor_event(&mut self, event: SupervisorEvent) {
        match event {
            SupervisorEvent::Log(line) => self.update(|s| s.logs.push(line)),
            SupervisorEvent::StateChanged(process) => {
                let crash = match process {
                    ServerProcessState::Crashed { exit_code } => Some(exit_code),
                    _ => None,
                };
                self.update(|s| s.process = process);
                if let Some(exit_code) = crash {
                    self.on_crash(exit_code);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn select_model(&self, model: String) {
        let clone_family = is_voice_clone_model(&model);
        self.update(|s| {
            s.selected_model = model;
            if clone_family {
                s.voice_cloning = true;
            }
        });
    }

    // ------------------------------------------------------------------
    // Server lifecycle
    // ------------------------------------------------------------------

    async fn start_server(&mut self, model: Option<String>, reply: Option<Reply>) {
        match self.phase() {
            ServerPhase::On => {
                debug!("start ignored, server already running");
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(()));
                }
                return;
            }
            ServerPhase::Starting => {
                debug!("start ignored, server already starting");
                self.start_waiters.extend(reply);
                return;
            }
            ServerPhase::Off => {}
        }

        if let Some(model) = model {
            self.select_model(model);
        }
        self.start_waiters.extend(reply);
        self.launch_server().await;
    }

    /// Spawn the selected model and start the readiness probe loop.
    async fn launch_server(&mut self) {
        let model = self.state.borrow().selected_model.clone();
        self.epoch += 1;
        let epoch = self.epoch;
        self.update(|s| {
            s.phase = ServerPhase::Starting;
            s.clear_error();
        });

        let launch = ServerLaunch {
            executable: self.settings.python_path.clone(),
            base_args: self.settings.server_args.clone(),
            model,
            port: self.settings.server_port,
        };
        info!(model = %launch.model, port = launch.port, epoch, "starting TTS server");

        if let Err(e) = self.ensure_process(launch).await {
            warn!(error = %e, "failed to spawn TTS server");
            let message = e.to_string();
            self.update(|s| {
                s.phase = ServerPhase::Off;
                s.fail(message.clone());
            });
            self.resolve_start(&Err(CoordinatorError::Failed(message)));
            return;
        }

        let client = Arc::clone(&self.deps.client);
        let supervisor = Arc::clone(&self.deps.supervisor);
        let interval = self.settings.probe_interval();
        let timeout = self.settings.startup_timeout();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let readiness =
                wait_until_ready(client.as_ref(), supervisor.as_ref(), interval, timeout).await;
            let _ = outcomes.send(TaskOutcome::Startup { epoch, readiness });
        });
    }

    /// Make sure a process for `launch.model` is alive.
    ///
    /// A process left running by an earlier readiness timeout is reused
    /// rather than spawned a second time.
    async fn ensure_process(&self, launch: ServerLaunch) -> Result<(), ProcessError> {
        let supervisor = &self.deps.supervisor;
        match supervisor.state() {
            ServerProcessState::Running { model, .. } if model == launch.model => {
                debug!(%model, "reusing live TTS server process");
                Ok(())
            }
            state if state.is_alive() => supervisor.restart(Some(launch.model)).await,
            _ => match supervisor.start(launch).await {
                Err(ProcessError::AlreadyRunning) => Ok(()),
                result => result,
            },
        }
    }

    fn on_startup(&mut self, epoch: u64, readiness: Readiness) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding stale startup outcome");
            return;
        }

        let alive = self.deps.supervisor.state().is_alive();
        match readiness {
            Readiness::Healthy if alive => {
                info!(epoch, "TTS server is ready");
                self.update(|s| s.phase = ServerPhase::On);
                self.resolve_start(&Ok(()));
                self.refresh_catalog();
            }
            Readiness::Healthy | Readiness::Exited => {
                warn!(epoch, "TTS server exited before becoming ready");
                self.update(|s| {
                    s.phase = ServerPhase::Off;
                    s.fail(EXITED_DURING_STARTUP);
                });
                self.resolve_start(&Err(CoordinatorError::Failed(
                    EXITED_DURING_STARTUP.to_string(),
                )));
            }
            Readiness::TimedOut => {
                // The process is left running so the user can inspect logs or
                // probe again.
                warn!(epoch, "TTS server did not answer health probes in time");
                self.update(|s| {
                    s.phase = ServerPhase::Off;
                    s.fail(NOT_RESPONDING);
                });
                self.resolve_start(&Err(CoordinatorError::Failed(NOT_RESPONDING.to_string())));
            }
        }
    }

    async fn stop_server(&mut self) {
        self.epoch += 1;
        info!(epoch = self.epoch, "stopping TTS server");
        self.deps.supervisor.stop().await;
        self.update(|s| {
            s.phase = ServerPhase::Off;
            s.clear_catalog();
        });
        self.resolve_start(&Err(CoordinatorError::Failed("Server stopped".to_string())));
    }

    async fn restart_server(&mut self, model: String) {
        self.epoch += 1;
        let epoch = self.epoch;
        info!(model = %model, epoch, "restarting TTS server");

        self.deps.supervisor.stop().await;
        self.update(|s| {
            s.phase = ServerPhase::Starting;
            s.clear_catalog();
            s.clear_error();
        });
        self.select_model(model.clone());

        let delay = self.settings.restart_settle();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = outcomes.send(TaskOutcome::RestartReady { epoch, model });
        });
    }

    fn check_server_status(&self) {
        if self.phase() == ServerPhase::Starting {
            debug!("status check skipped during startup");
            return;
        }
        if !self.deps.supervisor.state().is_alive() {
            debug!("status check skipped, no server process");
            return;
        }

        let epoch = self.epoch;
        let client = Arc::clone(&self.deps.client);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let healthy = client.check_health().await;
            let _ = outcomes.send(TaskOutcome::StatusProbe { epoch, healthy });
        });
    }

    fn on_status_probe(&mut self, epoch: u64, healthy: bool) {
        if epoch != self.epoch || self.phase() == ServerPhase::Starting {
            debug!(epoch, current = self.epoch, "discarding stale status probe");
            return;
        }

        let alive = self.deps.supervisor.state().is_alive();
        let was_on = self.phase() == ServerPhase::On;
        if healthy && alive {
            self.update(|s| {
                s.phase = ServerPhase::On;
                if !was_on {
                    s.clear_error();
                }
            });
            if !was_on {
                info!("TTS server is responding");
                self.refresh_catalog();
            }
        } else {
            debug!(healthy, alive, "TTS server not responding");
            self.update(|s| s.phase = ServerPhase::Off);
        }
    }

    fn on_crash(&mut self, exit_code: Option<i32>) {
        if self.deps.supervisor.state().is_alive() {
            debug!(?exit_code, "ignoring exit notice for a replaced process");
            return;
        }

        self.epoch += 1;
        warn!(?exit_code, epoch = self.epoch, "TTS server exited unexpectedly");
        let message = exit_code.map_or_else(
            || "Server exited unexpectedly. Check logs for details.".to_string(),
            |code| format!("Server exited unexpectedly (exit code {code}). Check logs for details."),
        );
        self.update(|s| {
            s.phase = ServerPhase::Off;
            s.clear_catalog();
            s.fail(message.clone());
        });
        self.resolve_start(&Err(CoordinatorError::Failed(message)));
    }

    fn resolve_start(&mut self, outcome: &Result<(), CoordinatorError>) {
        for waiter in self.start_waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    fn refresh_catalog(&self) {
        let epoch = self.epoch;
        let client = Arc::clone(&self.deps.client);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let (models, speakers, languages) = tokio::join!(
                client.list_models(),
                client.list_speakers(),
                client.list_languages()
            );
            let _ = outcomes.send(TaskOutcome::Catalog {
                epoch,
                models,
                speakers,
                languages,
            });
        });
    }

    fn on_catalog(
        &self,
        epoch: u64,
        models: Result<Vec<String>, crate::ports::SynthesisError>,
        speakers: Vec<String>,
        mut languages: Vec<String>,
    ) {
        if epoch != self.epoch || self.phase() != ServerPhase::On {
            debug!(epoch, current = self.epoch, "discarding stale catalog");
            return;
        }

        let models = models.unwrap_or_else(|e| {
            warn!(error = %e, "model listing failed, using built-in list");
            FALLBACK_MODELS.iter().map(ToString::to_string).collect()
        });
        if languages.is_empty() {
            languages = FALLBACK_LANGUAGES.iter().map(ToString::to_string).collect();
        }
        debug!(
            models = models.len(),
            speakers = speakers.len(),
            languages = languages.len(),
            "catalog refreshed"
        );
        self.update(|s| {
            s.models = models;
            s.speakers = speakers;
            s.languages = languages;
        });
    }

    // ------------------------------------------------------------------
    // Synthesis
    // ------------------------------------------------------------------

    fn prepare_synthesis(&self) -> Result<PreparedSynthesis, ValidationError> {
        let mut force_cloning = false;
        let prepared = {
            let s = self.state.borrow();
            if s.synthesizing {
                return Err(ValidationError::SynthesisInProgress);
            }
            if s.input_text.trim().is_empty() {
                return Err(ValidationError::EmptyInput);
            }
            if !s.is_server_running() {
                return Err(ValidationError::ServerNotRunning);
            }

            let clone_family = is_voice_clone_model(&s.selected_model);
            force_cloning = clone_family && !s.voice_cloning;
            let cloning = s.voice_cloning || clone_family;

            let call = match (&s.reference_audio, cloning) {
                (None, _) if clone_family => Err(ValidationError::MissingReference),
                (Some(reference), true) => Ok(SynthesisCall::VoiceClone(VoiceCloneRequest {
                    text: s.input_text.clone(),
                    reference_path: reference.clone(),
                    language: s.selected_language.clone(),
                })),
                _ => Ok(SynthesisCall::Plain(
                    SynthesisRequest::new(s.input_text.clone(), s.selected_model.clone())
                        .with_speaker(s.selected_speaker.clone())
                        .with_language(s.selected_language.clone())
                        .with_speed(s.speed),
                )),
            };
            call.map(|call| PreparedSynthesis {
                text: s.input_text.clone(),
                model: s.selected_model.clone(),
                call,
            })
        };

        if force_cloning {
            self.update(|s| s.voice_cloning = true);
        }
        prepared
    }

    fn synthesize(&mut self, reply: Option<Reply>) {
        let prepared = match self.prepare_synthesis() {
            Ok(prepared) => prepared,
            Err(ValidationError::SynthesisInProgress) => {
                debug!("synthesis already in flight");
                if let Some(reply) = reply {
                    let _ = reply.send(Err(CoordinatorError::Failed(
                        ValidationError::SynthesisInProgress.to_string(),
                    )));
                }
                return;
            }
            Err(e) => {
                debug!(error = %e, "synthesis rejected");
                let message = e.to_string();
                self.update(|s| s.fail(message.clone()));
                if let Some(reply) = reply {
                    let _ = reply.send(Err(CoordinatorError::Failed(message)));
                }
                return;
            }
        };

        self.update(|s| {
            s.synthesizing = true;
            s.clear_error();
        });
        self.synthesis_waiter = reply;

        let PreparedSynthesis { text, model, call } = prepared;
        info!(model = %model, chars = text.chars().count(), "synthesizing");
        let client = Arc::clone(&self.deps.client);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = match call {
                SynthesisCall::Plain(request) => client.synthesize(request).await,
                SynthesisCall::VoiceClone(request) => {
                    client.synthesize_with_voice_clone(request).await
                }
            };
            let _ = outcomes.send(TaskOutcome::Synthesized {
                text,
                model,
                result,
            });
        });
    }

    fn on_synthesized(
        &mut self,
        text: String,
        model: String,
        result: Result<bytes::Bytes, crate::ports::SynthesisError>,
    ) {
        let outcome = match result {
            Ok(audio) => {
                debug!(bytes = audio.len(), "synthesis finished");
                self.update(|s| s.last_audio = Some(audio.clone()));
                match self.deps.playback.play(audio.clone()) {
                    Ok(duration) => {
                        self.update(|s| {
                            let policy = s.history_policy;
                            s.history.record(
                                HistoryItem::new(text, model, audio, Some(duration)),
                                policy,
                            );
                        });
                        Ok(())
                    }
                    Err(e) => Err(format!("Failed to play audio: {e}")),
                }
            }
            Err(e) => Err(e.to_string()),
        };

        if let Err(message) = &outcome {
            warn!(error = %message, "synthesis failed");
        }
        self.update(|s| {
            s.synthesizing = false;
            if let Err(message) = &outcome {
                s.fail(message.clone());
            }
        });
        if let Some(reply) = self.synthesis_waiter.take() {
            let _ = reply.send(outcome.map_err(CoordinatorError::Failed));
        }
    }

    // ------------------------------------------------------------------
    // Playback and storage
    // ------------------------------------------------------------------

    fn play_history_item(&self, id: Uuid) {
        let audio = self.state.borrow().history.get(id).map(|item| item.audio.clone());
        let Some(audio) = audio else {
            warn!(%id, "history item not found");
            return;
        };
        if let Err(e) = self.deps.playback.play(audio) {
            warn!(error = %e, "history playback failed");
            self.update(|s| s.fail(format!("Failed to play audio: {e}")));
        }
    }

    fn save_audio(&self, filename: Option<String>, reply: Option<Reply>) {
        let audio = self.state.borrow().last_audio.clone();
        let Some(audio) = audio else {
            debug!("nothing to save");
            if let Some(reply) = reply {
                let _ = reply.send(Err(CoordinatorError::Failed(
                    "No audio to save".to_string(),
                )));
            }
            return;
        };

        let store = Arc::clone(&self.deps.store);
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = store.save_audio(audio, filename).await;
            let _ = outcomes.send(TaskOutcome::Saved { result, reply });
        });
    }

    fn transport(&self, command: TransportCommand) {
        let playback = &self.deps.playback;
        match command {
            TransportCommand::Pause => playback.pause(),
            TransportCommand::Resume => playback.resume(),
            TransportCommand::Stop => playback.stop(),
            TransportCommand::Seek(position) => playback.seek(position),
            TransportCommand::SeekFraction(fraction) => playback.seek_fraction(fraction),
        }
    }

    async fn shutdown(&mut self) {
        info!("coordinator shutting down");
        self.epoch += 1;
        self.deps.playback.stop();
        self.deps.supervisor.stop().await;
        self.update(|s| {
            s.phase = ServerPhase::Off;
            s.clear_catalog();
        });
        self.resolve_start(&Err(CoordinatorError::Closed));
        if let Some(reply) = self.synthesis_waiter.take() {
            let _ = reply.send(Err(CoordinatorError::Closed));
        }
    }
}

/// Probe until healthy, until the process goes away, or until `timeout`.
pub(super) async fn wait_until_ready(
    client: &dyn SynthesisClientPort,
    supervisor: &dyn ProcessSupervisorPort,
    interval: Duration,
    timeout: Duration,
) -> Readiness {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if !supervisor.state().is_alive() {
            return Readiness::Exited;
        }
        if client.check_health().await {
            return Readiness::Healthy;
        }
        if tokio::time::Instant::now() >= deadline {
            return Readiness::TimedOut;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Channel for commands whose completion the caller awaits.
pub(super) fn reply_channel() -> (Reply, oneshot::Receiver<Result<(), CoordinatorError>>) {
    oneshot::channel()
}
