//! Synthesis client port.
//!
//! The HTTP boundary to the TTS server. Each call is independent; there is
//! no session state beyond the shared connection pool.

use async_trait::async_trait;
use bytes::Bytes;

use super::SynthesisError;
use crate::domain::{SynthesisRequest, VoiceCloneRequest};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisClientPort: Send + Sync {
    /// Synthesize speech and return the raw audio bytes.
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, SynthesisError>;

    /// Synthesize speech in the voice of a reference recording.
    async fn synthesize_with_voice_clone(
        &self,
        request: VoiceCloneRequest,
    ) -> Result<Bytes, SynthesisError>;

    async fn list_models(&self) -> Result<Vec<String>, SynthesisError>;

    /// Empty when the server has no speakers or the call fails.
    async fn list_speakers(&self) -> Vec<String>;

    /// Empty when the server has no languages or the call fails.
    async fn list_languages(&self) -> Vec<String>;

    /// One liveness probe. Never errors.
    async fn check_health(&self) -> bool;
}
