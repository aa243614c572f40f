//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the coordinator expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest`, `rodio` or process types in any signature
//! - Intent-based methods (start the server, synthesize this request)
//! - Adapter-internal errors are mapped to these error types at the boundary

pub mod audio_playback;
pub mod audio_store;
pub mod process_supervisor;
pub mod synthesis_client;

use std::path::PathBuf;

use thiserror::Error;

pub use audio_playback::AudioPlaybackPort;
pub use audio_store::AudioStorePort;
pub use process_supervisor::ProcessSupervisorPort;
pub use synthesis_client::SynthesisClientPort;

#[cfg(test)]
pub use audio_playback::MockAudioPlaybackPort;
#[cfg(test)]
pub use audio_store::MockAudioStorePort;
#[cfg(test)]
pub use process_supervisor::MockProcessSupervisorPort;
#[cfg(test)]
pub use synthesis_client::MockSynthesisClientPort;

/// Errors from the process supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// A server process is already tracked.
    #[error("Server is already running")]
    AlreadyRunning,

    /// The OS refused to spawn the process.
    #[error("Failed to start server: {0}")]
    SpawnFailed(String),

    /// Restart was requested before any start.
    #[error("Server has never been started")]
    NeverStarted,
}

/// Input problems detected before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some text to synthesize")]
    EmptyInput,

    #[error("Server is not running. Please start the server first.")]
    ServerNotRunning,

    #[error(
        "XTTS model requires a reference audio file. Please select one in the Voice Cloning section."
    )]
    MissingReference,

    #[error("A synthesis is already in progress")]
    SynthesisInProgress,
}

/// Errors from synthesis requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// The request could not be turned into a valid HTTP request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with something we could not interpret.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Non-success status with no readable body.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// The server reported an error message.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Connection, timeout or body transfer failure.
    #[error("Network error: {0}")]
    Transport(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from audio playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    #[error("Audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("Audio thread has shut down")]
    AudioThreadDied,
}

/// Errors from the audio store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Failed to write {}: {message}", path.display())]
    WriteFailed { path: PathBuf, message: String },

    #[error("Invalid file name: {0}")]
    InvalidFilename(String),
}
