//! Published coordinator state.

use std::path::PathBuf;

use bytes::Bytes;

use crate::domain::{
    DEFAULT_LANGUAGE, History, HistoryPolicy, LogBuffer, ServerProcessState, clamp_speed,
};
use crate::settings::Settings;

/// Readiness of the TTS server as seen by the coordinator.
///
/// `On` is only entered after a successful health probe, never because the
/// process merely launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerPhase {
    #[default]
    Off,
    /// Spawned (or restarting) and waiting for the first healthy probe.
    Starting,
    On,
}

/// Everything a presentation layer can observe.
///
/// Only the coordinator task writes it; readers hold a
/// `watch::Receiver<CoordinatorState>`.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    pub input_text: String,
    pub selected_model: String,
    pub selected_speaker: Option<String>,
    pub selected_language: String,
    pub speed: f32,
    pub voice_cloning: bool,
    pub reference_audio: Option<PathBuf>,

    pub phase: ServerPhase,
    /// Last state reported by the process supervisor.
    pub process: ServerProcessState,
    pub synthesizing: bool,

    pub models: Vec<String>,
    pub speakers: Vec<String>,
    pub languages: Vec<String>,

    /// Bytes from the most recent successful synthesis.
    pub last_audio: Option<Bytes>,
    pub history: History,
    pub history_policy: HistoryPolicy,
    pub logs: LogBuffer,

    pub last_error: Option<String>,
    pub show_error: bool,
    pub last_saved: Option<PathBuf>,
}

impl CoordinatorState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            input_text: String::new(),
            selected_model: settings.default_model.clone(),
            selected_speaker: None,
            selected_language: DEFAULT_LANGUAGE.to_string(),
            speed: clamp_speed(settings.default_speed),
            voice_cloning: crate::domain::is_voice_clone_model(&settings.default_model),
            reference_audio: None,
            phase: ServerPhase::Off,
            process: ServerProcessState::NotStarted,
            synthesizing: false,
            models: Vec::new(),
            speakers: Vec::new(),
            languages: Vec::new(),
            last_audio: None,
            history: History::new(),
            history_policy: HistoryPolicy {
                enabled: settings.keep_audio_history,
                max_items: settings.max_history_items,
            },
            logs: LogBuffer::new(),
            last_error: None,
            show_error: false,
            last_saved: None,
        }
    }

    pub fn is_server_running(&self) -> bool {
        self.phase == ServerPhase::On
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ServerPhase::Starting
    }

    /// Whether `synthesize` would be accepted right now, ignoring input checks.
    pub fn can_synthesize(&self) -> bool {
        self.is_server_running() && !self.synthesizing
    }

    pub(super) fn fail(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.show_error = true;
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
        self.show_error = false;
    }

    pub(super) fn clear_catalog(&mut self) {
        self.models.clear();
        self.speakers.clear();
        self.languages.clear();
    }
}
