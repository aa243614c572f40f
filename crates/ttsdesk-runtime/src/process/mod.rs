//! Process supervision for the TTS server.
//!
//! # Structure
//!
//! - `ProcessSupervisor` - spawns, tracks and stops a single server process
//! - `spawn_stream_reader` - lossy line readers for stdout/stderr
//! - `shutdown_child` - SIGTERM → SIGKILL escalation with reaping

mod stream;
pub mod shutdown;
mod supervisor;

pub use shutdown::{DEFAULT_GRACE_PERIOD, shutdown_child};
pub use stream::spawn_stream_reader;
pub use supervisor::{DEFAULT_RESTART_SETTLE, ProcessSupervisor, SupervisorConfig};
