//! Server process state and launch description.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the supervised server process.
///
/// Owned by the process supervisor; everyone else sees snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ServerProcessState {
    #[default]
    NotStarted,
    Starting,
    Running {
        model: String,
        port: u16,
    },
    Stopping,
    /// The process exited without being asked to.
    Crashed {
        exit_code: Option<i32>,
    },
}

impl ServerProcessState {
    /// Whether a process is currently tracked and alive.
    pub const fn is_alive(&self) -> bool {
        matches!(self, Self::Starting | Self::Running { .. })
    }
}

impl fmt::Display for ServerProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Starting => f.write_str("starting"),
            Self::Running { model, port } => write!(f, "running {model} on port {port}"),
            Self::Stopping => f.write_str("stopping"),
            Self::Crashed {
                exit_code: Some(code),
            } => write!(f, "crashed (exit code {code})"),
            Self::Crashed { exit_code: None } => f.write_str("crashed (killed by signal)"),
        }
    }
}

/// Everything needed to launch the server process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLaunch {
    pub executable: String,
    /// Arguments placed before the port and model flags.
    pub base_args: Vec<String>,
    pub model: String,
    pub port: u16,
}

impl ServerLaunch {
    /// Full argument vector: base args, then `--port` and `--model_name`.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "--port".to_string(),
            self.port.to_string(),
            "--model_name".to_string(),
            self.model.clone(),
        ]);
        args
    }

    /// Same launch with another model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
