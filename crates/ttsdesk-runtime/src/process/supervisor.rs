//! Lifecycle management for the TTS server process.
//!
//! One process at a time. Output lines and state changes are published as
//! [`SupervisorEvent`]s; the current state is also available through a
//! watch channel for callers that only need snapshots.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ttsdesk_core::events::supervisor_channel;
use ttsdesk_core::{
    LogLine, LogStream, ProcessError, ProcessSupervisorPort, ServerLaunch, ServerProcessState,
    SupervisorEvent, SupervisorEventReceiver, SupervisorEventSender,
};

use super::shutdown::{DEFAULT_GRACE_PERIOD, shutdown_child};
use super::stream::spawn_stream_reader;

/// Default pause between stopping and starting during a restart.
pub const DEFAULT_RESTART_SETTLE: Duration = Duration::from_secs(1);

/// Timing knobs for [`ProcessSupervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Time between SIGTERM and SIGKILL.
    pub grace_period: Duration,
    /// Pause between stop and start in [`ProcessSupervisor::restart`].
    pub restart_settle: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            restart_settle: DEFAULT_RESTART_SETTLE,
        }
    }
}

impl SupervisorConfig {
    #[must_use]
    pub const fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    #[must_use]
    pub const fn with_restart_settle(mut self, settle: Duration) -> Self {
        self.restart_settle = settle;
        self
    }
}

/// A spawned process and the means to stop it.
struct Tracked {
    generation: u64,
    pid: Option<u32>,
    launch: ServerLaunch,
    stop_tx: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    current: Option<Tracked>,
    last_launch: Option<ServerLaunch>,
    /// Watchers of stopped processes that have not been reaped yet.
    stopping: Vec<JoinHandle<()>>,
    /// Bumped on every successful spawn.
    generation: u64,
}

/// State shared between the supervisor and its watcher tasks.
struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<ServerProcessState>,
    events: SupervisorEventSender,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Update the snapshot first so a receiver reacting to the event sees it.
    fn publish(&self, state: ServerProcessState) {
        self.state.send_replace(state.clone());
        let _ = self.events.send(SupervisorEvent::StateChanged(state));
    }

    fn log(&self, text: impl Into<String>) {
        let _ = self
            .events
            .send(SupervisorEvent::Log(LogLine::supervisor(text)));
    }
}

/// Supervises the external TTS server process.
///
/// Dropping the supervisor kills any live child.
pub struct ProcessSupervisor {
    shared: Arc<Shared>,
    config: SupervisorConfig,
}

impl ProcessSupervisor {
    /// Create a supervisor and the receiver for its events.
    pub fn new(config: SupervisorConfig) -> (Self, SupervisorEventReceiver) {
        let (events, receiver) = supervisor_channel();
        (Self::with_events(config, events), receiver)
    }

    /// Create a supervisor publishing on an existing channel.
    pub fn with_events(config: SupervisorConfig, events: SupervisorEventSender) -> Self {
        let (state, _) = watch::channel(ServerProcessState::NotStarted);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                state,
                events,
            }),
            config,
        }
    }

    pub fn state(&self) -> ServerProcessState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ServerProcessState> {
        self.shared.state.subscribe()
    }

    /// Model of the tracked process, if any.
    pub fn current_model(&self) -> Option<String> {
        self.shared
            .lock()
            .current
            .as_ref()
            .map(|t| t.launch.model.clone())
    }

    pub fn pid(&self) -> Option<u32> {
        self.shared.lock().current.as_ref().and_then(|t| t.pid)
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().current.is_some()
    }

    /// Spawn the server described by `launch`.
    pub fn spawn(&self, launch: ServerLaunch) -> Result<(), ProcessError> {
        let mut inner = self.shared.lock();
        if inner.current.is_some() {
            return Err(ProcessError::AlreadyRunning);
        }

        self.shared
            .log(format!("Starting TTS server with model: {}", launch.model));
        self.shared.publish(ServerProcessState::Starting);

        let mut child = match build_command(&launch).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(executable = %launch.executable, error = %e, "failed to spawn TTS server");
                let err = ProcessError::SpawnFailed(e.to_string());
                self.shared.log(err.to_string());
                self.shared.publish(ServerProcessState::NotStarted);
                return Err(err);
            }
        };

        inner.generation += 1;
        let generation = inner.generation;
        let pid = child.id();
        let port = launch.port;

        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, port, LogStream::Stdout, self.shared.events.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, port, LogStream::Stderr, self.shared.events.clone());
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let watcher = tokio::spawn(watch_child(
            child,
            stop_rx,
            generation,
            Arc::clone(&self.shared),
            self.config.grace_period,
        ));

        info!(model = %launch.model, port, ?pid, "TTS server spawned");
        self.shared.log(format!("Server running on port {port}"));
        self.shared.publish(ServerProcessState::Running {
            model: launch.model.clone(),
            port,
        });

        inner.last_launch = Some(launch.clone());
        inner.current = Some(Tracked {
            generation,
            pid,
            launch,
            stop_tx,
            watcher,
        });
        Ok(())
    }

    /// Detach the tracked process and signal it to exit.
    ///
    /// Its watcher is parked in `stopping` until [`Self::shutdown`] awaits it.
    fn begin_stop(&self) {
        let (pid, launch, stop_tx) = {
            let mut inner = self.shared.lock();
            inner.stopping.retain(|watcher| !watcher.is_finished());
            let Some(Tracked {
                pid,
                launch,
                stop_tx,
                watcher,
                ..
            }) = inner.current.take()
            else {
                return;
            };
            inner.stopping.push(watcher);
            // Under the lock, so a watcher settling the state comes after
            self.shared.publish(ServerProcessState::Stopping);
            (pid, launch, stop_tx)
        };

        debug!(?pid, model = %launch.model, "stopping TTS server");
        let _ = stop_tx.send(());
        self.shared.log("Server stopped");
    }

    /// Stop the tracked process without waiting for it to exit.
    pub fn stop_now(&self) {
        self.begin_stop();
    }

    /// Stop the tracked process and wait until every stopped process,
    /// including ones stopped earlier through [`Self::stop_now`], has been
    /// reaped.
    pub async fn shutdown(&self) {
        self.begin_stop();
        let pending = std::mem::take(&mut self.shared.lock().stopping);
        for watcher in pending {
            let _ = watcher.await;
        }
    }

    /// Stop, wait for the process to exit and the settle delay, then
    /// start again with the previous launch.
    pub async fn restart_with(&self, model: Option<String>) -> Result<(), ProcessError> {
        let previous = self
            .shared
            .lock()
            .last_launch
            .clone()
            .ok_or(ProcessError::NeverStarted)?;

        self.shutdown().await;
        tokio::time::sleep(self.config.restart_settle).await;

        let launch = match model {
            Some(model) => previous.with_model(model),
            None => previous,
        };
        self.spawn(launch)
    }
}

fn build_command(launch: &ServerLaunch) -> Command {
    let mut cmd = Command::new(&launch.executable);
    cmd.args(launch.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Wait for the child to exit on its own or for a stop request.
async fn watch_child(
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    generation: u64,
    shared: Arc<Shared>,
    grace: Duration,
) {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = stop_rx => None,
    };

    match exited {
        Some(status) => {
            let exit_code = status.ok().and_then(|s| s.code());
            let current = {
                let mut inner = shared.lock();
                let current = inner
                    .current
                    .as_ref()
                    .is_some_and(|t| t.generation == generation);
                if current {
                    inner.current = None;
                }
                current
            };

            if current {
                warn!(?exit_code, "TTS server exited unexpectedly");
                match exit_code {
                    Some(code) => shared.log(format!("Server exited with code {code}")),
                    None => shared.log("Server was terminated by a signal"),
                }
                shared.publish(ServerProcessState::Crashed { exit_code });
            } else if shared.lock().generation == generation {
                // Stopped after it had already exited; the stop request
                // was never seen, so settle the state here
                shared.publish(ServerProcessState::NotStarted);
            }
        }
        None => {
            match shutdown_child(child, grace).await {
                Ok(status) => debug!(%status, "TTS server reaped"),
                Err(e) => warn!(error = %e, "failed to shut down TTS server cleanly"),
            }
            // A newer process may have been spawned meanwhile
            if shared.lock().generation == generation {
                shared.publish(ServerProcessState::NotStarted);
            }
        }
    }
}

#[async_trait]
impl ProcessSupervisorPort for ProcessSupervisor {
    async fn start(&self, launch: ServerLaunch) -> Result<(), ProcessError> {
        self.spawn(launch)
    }

    async fn stop(&self) {
        self.stop_now();
    }

    async fn restart(&self, model: Option<String>) -> Result<(), ProcessError> {
        self.restart_with(model).await
    }

    fn state(&self) -> ServerProcessState {
        Self::state(self)
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        // Watchers own their children; aborting one drops the child, which
        // kills it where signals are unavailable.
        for watcher in inner.stopping.drain(..) {
            watcher.abort();
        }
        let Some(tracked) = inner.current.take() else {
            return;
        };
        #[cfg(unix)]
        if let Some(pid) = tracked.pid {
            super::shutdown::kill_pid(pid);
        }
        tracked.watcher.abort();
    }
}
