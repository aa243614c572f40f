//! Process supervisor port.
//!
//! Owns the lifecycle of the external TTS server process. Output lines and
//! state changes are published as `SupervisorEvent`s on the channel handed
//! out when the supervisor is constructed.

use async_trait::async_trait;

use super::ProcessError;
use crate::domain::{ServerLaunch, ServerProcessState};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessSupervisorPort: Send + Sync {
    /// Spawn the server. Returns as soon as the process exists; readiness
    /// is the caller's concern.
    async fn start(&self, launch: ServerLaunch) -> Result<(), ProcessError>;

    /// Ask the tracked process to exit and forget it. Idempotent.
    async fn stop(&self);

    /// Stop, wait the settle delay, and start again with the last launch,
    /// optionally switching model.
    async fn restart(&self, model: Option<String>) -> Result<(), ProcessError>;

    /// Current state snapshot.
    fn state(&self) -> ServerProcessState;
}
