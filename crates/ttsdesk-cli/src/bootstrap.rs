//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - Process supervisor and audio store (via ttsdesk-runtime)
//! - HTTP synthesis client (via ttsdesk-client)
//! - Audio playback thread (via ttsdesk-audio)
//! - The synthesis coordinator (via ttsdesk-core)

use std::sync::Arc;

use anyhow::Result;
use ttsdesk_audio::AudioPlayback;
use ttsdesk_client::{TtsClient, TtsClientConfig};
use ttsdesk_core::{CoordinatorDeps, CoordinatorHandle, Settings, spawn_coordinator, validate_settings};
use ttsdesk_runtime::{FileAudioStore, ProcessSupervisor, SupervisorConfig};

use crate::error::CliError;
use crate::parser::Cli;

/// Build `Settings` from defaults overridden by global flags.
pub fn settings_from_cli(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = Settings::default();
    if let Some(port) = cli.port {
        settings.server_port = port;
    }
    if let Some(ref python) = cli.python {
        settings.python_path.clone_from(python);
    }
    if let Some(ref dir) = cli.output_dir {
        settings.output_directory.clone_from(dir);
    }
    if let Some(secs) = cli.startup_timeout {
        settings.startup_timeout_secs = secs;
    }
    validate_settings(&settings)?;
    Ok(settings)
}

/// HTTP client for the server on the configured port.
pub fn client_for(settings: &Settings) -> Result<TtsClient, CliError> {
    TtsClient::new(&TtsClientConfig::for_port(settings.server_port))
        .map_err(|e| CliError::Server(e.to_string()))
}

/// Fully composed application context for commands that own a server.
pub struct CliContext {
    pub settings: Arc<Settings>,
    pub coordinator: CoordinatorHandle,
    supervisor: Arc<ProcessSupervisor>,
}

impl CliContext {
    /// Stop the server and wait for the process to be reaped.
    pub async fn shutdown(&self) {
        if let Err(e) = self.coordinator.shutdown().await {
            tracing::debug!(error = %e, "coordinator already stopped");
        }
        self.supervisor.shutdown().await;
    }
}

/// Bootstrap the full pipeline.
///
/// Must be called inside a Tokio runtime; the coordinator task is spawned
/// on it.
pub fn bootstrap(settings: Settings) -> Result<CliContext> {
    let settings = Arc::new(settings);

    let (supervisor, events) = ProcessSupervisor::new(
        SupervisorConfig::default().with_restart_settle(settings.restart_settle()),
    );
    let supervisor = Arc::new(supervisor);

    let client = client_for(&settings)?;
    let playback = AudioPlayback::spawn().map_err(|e| CliError::Audio(e.to_string()))?;
    let store = FileAudioStore::new(settings.output_directory.clone());

    let deps = CoordinatorDeps {
        supervisor: supervisor.clone(),
        client: Arc::new(client),
        playback: Arc::new(playback),
        store: Arc::new(store),
    };
    let coordinator = spawn_coordinator(Arc::clone(&settings), deps, events);

    Ok(CliContext {
        settings,
        coordinator,
        supervisor,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ttsdesk_core::SettingsError;

    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["ttsdesk", "status"]);
        let settings = settings_from_cli(&cli).unwrap();
        assert_eq!(settings.server_port, 5002);
        assert_eq!(settings.python_path, "python3");
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "ttsdesk",
            "--port",
            "6000",
            "--python",
            "/opt/py/bin/python",
            "--startup-timeout",
            "30",
            "status",
        ]);
        let settings = settings_from_cli(&cli).unwrap();
        assert_eq!(settings.server_port, 6000);
        assert_eq!(settings.python_path, "/opt/py/bin/python");
        assert_eq!(settings.startup_timeout_secs, 30);
        assert_eq!(settings.server_url(), "http://localhost:6000");
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let cli = Cli::parse_from(["ttsdesk", "--port", "80", "status"]);
        assert!(matches!(
            settings_from_cli(&cli),
            Err(CliError::Config(SettingsError::InvalidPort(80)))
        ));

        let cli = Cli::parse_from(["ttsdesk", "--python", "  ", "status"]);
        assert!(matches!(
            settings_from_cli(&cli),
            Err(CliError::Config(SettingsError::EmptyPythonPath))
        ));
    }
}
