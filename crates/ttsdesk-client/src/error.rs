//! Internal error types for TTS server calls.
//!
//! These errors are internal to `ttsdesk-client` and are mapped to
//! `SynthesisError` at the port boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-200 status.
    #[error("TTS server request failed with status {status}")]
    Status {
        status: u16,
        /// Error text extracted from the response body, if any.
        message: Option<String>,
    },

    /// The server answered 200 with something unusable.
    #[error("Invalid response from TTS server: {message}")]
    InvalidResponse { message: String },

    /// The reference recording for voice cloning could not be read.
    #[error("Failed to read reference audio {}: {source}", path.display())]
    ReferenceAudio {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = ClientError::Status {
            status: 500,
            message: Some("model exploded".to_string()),
        };
        assert!(error.to_string().contains("500"));
    }

    #[test]
    fn test_reference_audio_error_message() {
        let error = ClientError::ReferenceAudio {
            path: PathBuf::from("/tmp/voice.wav"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = error.to_string();
        assert!(msg.contains("/tmp/voice.wav"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_url_error_converts() {
        let error: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(error, ClientError::InvalidUrl(_)));
    }
}
