//! Settings domain types and validation.
//!
//! One `Settings` value is built by the composition root and shared
//! read-only (`Arc<Settings>`) with every component that needs it.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default port the TTS server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 5002;

/// Default model handed to the server on start.
pub const DEFAULT_MODEL: &str = "tts_models/en/ljspeech/tacotron2-DDC";

/// Default interpreter used to launch the server module.
pub const DEFAULT_PYTHON: &str = "python3";

/// Default history cap.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 50;

/// Application settings.
///
/// Every field has a default so partially written config files deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Port passed to the server as `--port`.
    pub server_port: u16,

    /// Interpreter (or wrapper executable) that launches the server.
    pub python_path: String,

    /// Arguments placed before `--port`/`--model_name`.
    pub server_args: Vec<String>,

    /// Model loaded when no explicit model is requested.
    pub default_model: String,

    /// Start the server as soon as the coordinator comes up.
    pub auto_start_server: bool,

    /// Where saved audio lands.
    pub output_directory: PathBuf,

    /// Initial playback speed for new requests.
    pub default_speed: f32,

    /// Record successful syntheses in the history list.
    pub keep_audio_history: bool,

    /// History cap; the oldest items are dropped past it.
    pub max_history_items: usize,

    /// Delay between readiness probes while the server boots.
    pub probe_interval_ms: u64,

    /// Give up waiting for readiness after this long.
    pub startup_timeout_secs: u64,

    /// Pause between stop and start during a restart.
    pub restart_settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            python_path: DEFAULT_PYTHON.to_string(),
            server_args: vec!["-m".to_string(), "TTS.server.server".to_string()],
            default_model: DEFAULT_MODEL.to_string(),
            auto_start_server: false,
            output_directory: default_output_directory(),
            default_speed: 1.0,
            keep_audio_history: true,
            max_history_items: DEFAULT_MAX_HISTORY_ITEMS,
            probe_interval_ms: 500,
            startup_timeout_secs: 120,
            restart_settle_ms: 1000,
        }
    }
}

impl Settings {
    /// Base URL of the local server's HTTP endpoint.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.server_port)
    }

    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    #[must_use]
    pub const fn restart_settle(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }
}

/// The user's documents directory, or the working directory when the
/// platform has none.
pub fn default_output_directory() -> PathBuf {
    dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Server port must be at least 1024, got {0}")]
    InvalidPort(u16),

    #[error("Python path cannot be empty")]
    EmptyPythonPath,

    #[error("Default model cannot be empty")]
    EmptyModel,

    #[error("Default speed must be between 0.5 and 2.0, got {0}")]
    InvalidSpeed(f32),

    #[error("Max history items must be at least 1, got {0}")]
    InvalidHistoryLimit(usize),

    #[error("Startup timeout must be at least one second")]
    InvalidStartupTimeout,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.server_port < 1024 {
        return Err(SettingsError::InvalidPort(settings.server_port));
    }

    if settings.python_path.trim().is_empty() {
        return Err(SettingsError::EmptyPythonPath);
    }

    if settings.default_model.trim().is_empty() {
        return Err(SettingsError::EmptyModel);
    }

    if !(0.5..=2.0).contains(&settings.default_speed) {
        return Err(SettingsError::InvalidSpeed(settings.default_speed));
    }

    if settings.max_history_items == 0 {
        return Err(SettingsError::InvalidHistoryLimit(settings.max_history_items));
    }

    if settings.startup_timeout_secs == 0 {
        return Err(SettingsError::InvalidStartupTimeout);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server_port, 5002);
        assert_eq!(settings.default_model, DEFAULT_MODEL);
        assert!(!settings.auto_start_server);
        assert!(settings.keep_audio_history);
        assert_eq!(settings.max_history_items, 50);
        assert!((settings.default_speed - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.server_args, vec!["-m", "TTS.server.server"]);
    }

    #[test]
    fn test_server_url() {
        let settings = Settings {
            server_port: 5123,
            ..Settings::default()
        };
        assert_eq!(settings.server_url(), "http://localhost:5123");
    }

    #[test]
    fn test_validate_defaults() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_port() {
        let settings = Settings {
            server_port: 80,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPort(80))
        ));
    }

    #[test]
    fn test_validate_speed_and_history() {
        let settings = Settings {
            default_speed: 3.0,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidSpeed(_))
        ));

        let settings = Settings {
            max_history_items: 0,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidHistoryLimit(0))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"server_port": 6000, "auto_start_server": true}"#).unwrap();
        assert_eq!(settings.server_port, 6000);
        assert!(settings.auto_start_server);
        assert_eq!(settings.python_path, DEFAULT_PYTHON);
        assert_eq!(settings.restart_settle_ms, 1000);
    }
}
