//! Port trait implementation for `TtsClient`.
//!
//! Implements the core-owned `SynthesisClientPort`, converting internal
//! client errors into `SynthesisError`.

use async_trait::async_trait;
use bytes::Bytes;
use ttsdesk_core::{SynthesisClientPort, SynthesisError, SynthesisRequest, VoiceCloneRequest};

use crate::client::TtsClient;
use crate::config::TtsClientConfig;
use crate::error::ClientError;
use crate::url::{LANGUAGES_PATH, MODELS_PATH, SPEAKERS_PATH};

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `ClientError` to core `SynthesisError`.
pub(crate) fn map_error(err: ClientError) -> SynthesisError {
    match err {
        ClientError::Status {
            message: Some(message),
            ..
        } => SynthesisError::ServerError(message),
        ClientError::Status {
            status,
            message: None,
        } => SynthesisError::HttpError(status),
        ClientError::InvalidResponse { message } => SynthesisError::InvalidResponse(message),
        ClientError::ReferenceAudio { .. } => SynthesisError::ServerError(err.to_string()),
        ClientError::Network(e) => SynthesisError::Transport(e.to_string()),
        ClientError::InvalidUrl(e) => SynthesisError::InvalidRequest(e.to_string()),
        ClientError::JsonParse(e) => SynthesisError::InvalidResponse(e.to_string()),
    }
}

impl TtsClient {
    /// Create a client for the server described by `config`.
    pub fn new(config: &TtsClientConfig) -> Result<Self, SynthesisError> {
        Self::build(config).map_err(map_error)
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl SynthesisClientPort for TtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, SynthesisError> {
        self.fetch_speech(&request).await.map_err(map_error)
    }

    async fn synthesize_with_voice_clone(
        &self,
        request: VoiceCloneRequest,
    ) -> Result<Bytes, SynthesisError> {
        self.fetch_cloned_speech(&request).await.map_err(map_error)
    }

    async fn list_models(&self) -> Result<Vec<String>, SynthesisError> {
        self.get_string_list(MODELS_PATH).await.map_err(map_error)
    }

    async fn list_speakers(&self) -> Vec<String> {
        self.get_string_list_or_empty(SPEAKERS_PATH).await
    }

    async fn list_languages(&self) -> Vec<String> {
        self.get_string_list_or_empty(LANGUAGES_PATH).await
    }

    async fn check_health(&self) -> bool {
        self.probe().await
    }
}
