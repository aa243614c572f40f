//! URL construction helpers for the TTS server API.
//!
//! Pure functions, so every endpoint is built the same way and can be
//! checked without a server.

use ttsdesk_core::SynthesisRequest;
use url::Url;

use crate::error::ClientResult;

pub const TTS_PATH: &str = "api/tts";
pub const MODELS_PATH: &str = "api/models";
pub const SPEAKERS_PATH: &str = "api/speakers";
pub const LANGUAGES_PATH: &str = "api/languages";

/// Parse the configured server root.
pub fn parse_base_url(base: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base)?;
    // `join` replaces the last segment unless the path ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve an API path against the server root.
pub fn endpoint(base: &Url, path: &str) -> ClientResult<Url> {
    Ok(base.join(path)?)
}

/// `GET /api/tts` with the request encoded as query parameters.
///
/// `speaker_id` is omitted without a speaker, `language_id` when empty,
/// and `speed` at the neutral speed.
pub fn build_tts_url(base: &Url, request: &SynthesisRequest) -> ClientResult<Url> {
    let mut url = endpoint(base, TTS_PATH)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("text", &request.text);
        if let Some(ref speaker) = request.speaker {
            query.append_pair("speaker_id", speaker);
        }
        if !request.language.is_empty() {
            query.append_pair("language_id", &request.language);
        }
        if !request.is_neutral_speed() {
            query.append_pair("speed", &request.speed.to_string());
        }
    }
    Ok(url)
}
