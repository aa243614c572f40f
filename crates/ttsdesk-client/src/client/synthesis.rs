//! Speech synthesis requests.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use ttsdesk_core::{SynthesisRequest, VoiceCloneRequest};

use super::{TtsClient, is_ok, status_error};
use crate::error::{ClientError, ClientResult};
use crate::url::{TTS_PATH, build_tts_url, endpoint};

/// Message used when a voice-clone request fails without a readable body.
const VOICE_CLONE_FAILED: &str = "Voice cloning failed";

impl TtsClient {
    /// `GET /api/tts` and return the audio body.
    pub(crate) async fn fetch_speech(&self, request: &SynthesisRequest) -> ClientResult<Bytes> {
        let url = build_tts_url(&self.base, request)?;
        debug!(url = %url, chars = request.text.chars().count(), "requesting synthesis");

        let response = self.http.get(url).send().await?;
        if !is_ok(response.status()) {
            return Err(status_error(response).await);
        }
        Ok(response.bytes().await?)
    }

    /// `POST /api/tts` as multipart with the reference recording attached.
    pub(crate) async fn fetch_cloned_speech(
        &self,
        request: &VoiceCloneRequest,
    ) -> ClientResult<Bytes> {
        let url = endpoint(&self.base, TTS_PATH)?;
        let reference = tokio::fs::read(&request.reference_path)
            .await
            .map_err(|source| ClientError::ReferenceAudio {
                path: request.reference_path.clone(),
                source,
            })?;

        let (file_name, mime) = reference_metadata(&request.reference_path);
        let speaker_wav = Part::bytes(reference)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = Form::new()
            .text("text", request.text.clone())
            .text("language_id", request.language.clone())
            .part("speaker_wav", speaker_wav);

        debug!(url = %url, reference = %request.reference_path.display(), "requesting voice clone");
        let response = self.http.post(url).multipart(form).send().await?;
        if !is_ok(response.status()) {
            return Err(match status_error(response).await {
                ClientError::Status { status, message } => ClientError::Status {
                    status,
                    message: message.or_else(|| Some(VOICE_CLONE_FAILED.to_string())),
                },
                other => other,
            });
        }
        Ok(response.bytes().await?)
    }
}

/// File name and MIME type sent with the reference recording.
pub(crate) fn reference_metadata(path: &Path) -> (String, &'static str) {
    let file_name = path
        .file_name()
        .map_or_else(|| "reference.wav".to_string(), |n| n.to_string_lossy().into_owned());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let mime = match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    };
    (file_name, mime)
}
