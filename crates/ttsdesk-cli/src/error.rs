//! CLI-specific error types and their exit codes.

use thiserror::Error;
use ttsdesk_core::{CoordinatorError, SettingsError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings assembled from flags and environment are invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    /// The TTS server could not be reached or failed to start.
    #[error("Server error: {0}")]
    Server(String),

    /// Synthesis, playback or saving failed.
    #[error("{0}")]
    Coordinator(String),

    /// Audio output could not be opened.
    #[error("Audio error: {0}")]
    Audio(String),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Server(_) => 69,      // EX_UNAVAILABLE
            Self::Coordinator(_) => 1,
            Self::Audio(_) => 74,       // EX_IOERR
        }
    }
}

impl From<CoordinatorError> for CliError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Closed => Self::Coordinator("coordinator stopped unexpectedly".into()),
            CoordinatorError::Failed(message) => Self::Coordinator(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config(SettingsError::EmptyModel).exit_code(), 78);
        assert_eq!(CliError::Server("down".into()).exit_code(), 69);
        assert_eq!(CliError::Audio("no device".into()).exit_code(), 74);
    }

    #[test]
    fn test_coordinator_failure_keeps_message() {
        let err = CliError::from(CoordinatorError::Failed("Please enter some text".into()));
        assert_eq!(err.to_string(), "Please enter some text");
        assert_eq!(err.exit_code(), 1);
    }
}
