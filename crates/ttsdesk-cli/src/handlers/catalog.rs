//! Listing commands against an already running server.

use anyhow::Result;
use ttsdesk_client::TtsClient;
use ttsdesk_core::{FALLBACK_MODELS, Settings, SynthesisClientPort};

use crate::bootstrap::client_for;
use crate::error::CliError;
use crate::presentation::print_list;

/// Which listing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Models,
    Speakers,
    Languages,
}

/// Execute one of the listing commands.
pub async fn execute(settings: &Settings, catalog: Catalog) -> Result<()> {
    let client = client_for(settings)?;
    ensure_reachable(&client, settings).await?;

    match catalog {
        Catalog::Models => match client.list_models().await {
            Ok(models) => print_list("Models", &models, "The server reported no models."),
            Err(e) => {
                tracing::warn!(error = %e, "model listing failed");
                let fallback: Vec<String> =
                    FALLBACK_MODELS.iter().map(ToString::to_string).collect();
                println!("Could not list models ({e}); known models:");
                print_list("Models", &fallback, "");
            }
        },
        Catalog::Speakers => print_list(
            "Speakers",
            &client.list_speakers().await,
            "The loaded model has a single speaker.",
        ),
        Catalog::Languages => print_list(
            "Languages",
            &client.list_languages().await,
            "The loaded model is not multilingual.",
        ),
    }
    Ok(())
}

async fn ensure_reachable(client: &TtsClient, settings: &Settings) -> Result<(), CliError> {
    if client.check_health().await {
        Ok(())
    } else {
        Err(CliError::Server(format!(
            "no TTS server at {} (start one with `ttsdesk serve`)",
            settings.server_url()
        )))
    }
}
