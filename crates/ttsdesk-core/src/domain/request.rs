//! Synthesis request types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Slowest supported playback speed multiplier.
pub const MIN_SPEED: f32 = 0.5;

/// Fastest supported playback speed multiplier.
pub const MAX_SPEED: f32 = 2.0;

/// Speed at which the server is not asked to rescale.
pub const NEUTRAL_SPEED: f32 = 1.0;

/// Models offered when the server cannot list its own.
pub const FALLBACK_MODELS: &[&str] = &[
    "tts_models/en/ljspeech/tacotron2-DDC",
    "tts_models/en/ljspeech/glow-tts",
    "tts_models/en/ljspeech/vits",
    "tts_models/en/vctk/vits",
    "tts_models/multilingual/multi-dataset/xtts_v2",
];

/// Language codes offered when the server reports none.
pub const FALLBACK_LANGUAGES: &[&str] = &[
    "en", "zh", "ja", "ko", "de", "fr", "es", "it", "pt", "ru", "ar", "hi",
];

/// Language selected until the user picks another.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Clamp a speed multiplier into the supported range.
#[must_use]
pub fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Whether a model belongs to the voice-clone family (needs reference audio).
pub fn is_voice_clone_model(model: &str) -> bool {
    model.to_ascii_lowercase().contains("xtts")
}

/// A plain text-to-speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: String,
    pub speaker: Option<String>,
    /// Empty means "let the server choose".
    pub language: String,
    pub speed: f32,
}

impl SynthesisRequest {
    /// Build a request with the server's defaults for speaker and language.
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            speaker: None,
            language: String::new(),
            speed: NEUTRAL_SPEED,
        }
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker: Option<String>) -> Self {
        self.speaker = speaker.filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the speed, clamped to the supported range.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = clamp_speed(speed);
        self
    }

    /// True when the request does not ask the server to rescale speed.
    pub fn is_neutral_speed(&self) -> bool {
        (self.speed - NEUTRAL_SPEED).abs() <= f32::EPSILON
    }
}

/// A voice-clone request carrying a reference recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCloneRequest {
    pub text: String,
    pub reference_path: PathBuf,
    pub language: String,
}
