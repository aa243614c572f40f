//! Status command handler.

use anyhow::Result;
use ttsdesk_core::{Settings, SynthesisClientPort};

use crate::bootstrap::client_for;
use crate::error::CliError;

/// Probe the configured port once.
pub async fn execute(settings: &Settings) -> Result<()> {
    let client = client_for(settings)?;
    if client.check_health().await {
        println!("TTS server is running at {}", settings.server_url());
        Ok(())
    } else {
        Err(CliError::Server(format!("TTS server is not running at {}", settings.server_url())).into())
    }
}
