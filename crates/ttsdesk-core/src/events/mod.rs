//! Events published by the process supervisor.
//!
//! Supervisor tasks (stream readers, exit watcher) never touch coordinator
//! state directly. They send `SupervisorEvent`s over an unbounded channel and
//! the coordinator loop applies them in arrival order.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::{LogLine, ServerProcessState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupervisorEvent {
    /// A captured output line or a lifecycle message.
    Log(LogLine),
    /// The process state changed.
    StateChanged(ServerProcessState),
}

/// Sending half used by supervisor tasks.
pub type SupervisorEventSender = mpsc::UnboundedSender<SupervisorEvent>;

/// Receiving half consumed by the coordinator.
pub type SupervisorEventReceiver = mpsc::UnboundedReceiver<SupervisorEvent>;

/// Create a supervisor event channel.
pub fn supervisor_channel() -> (SupervisorEventSender, SupervisorEventReceiver) {
    mpsc::unbounded_channel()
}
