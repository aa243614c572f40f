//! Say command handler.
//!
//! Boots a server, speaks one piece of text, waits for playback to end,
//! and optionally saves the audio.

use anyhow::Result;
use ttsdesk_core::{PlaybackState, format_time};

use crate::bootstrap::CliContext;
use crate::commands::SayArgs;
use crate::error::CliError;

/// Execute the say command.
pub async fn execute(ctx: &CliContext, args: SayArgs) -> Result<()> {
    let coordinator = &ctx.coordinator;

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| ctx.settings.default_model.clone());
    println!("Starting TTS server with {model}...");
    coordinator
        .start_server_and_wait(Some(model))
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    if args.speaker.is_some() {
        coordinator.select_speaker(args.speaker)?;
    }
    if let Some(language) = args.language {
        coordinator.select_language(language)?;
    }
    if let Some(speed) = args.speed {
        coordinator.set_speed(speed)?;
    }
    if let Some(reference) = args.reference {
        coordinator.set_reference_audio(reference)?;
        coordinator.set_voice_cloning(true)?;
    }
    coordinator.set_input_text(args.text)?;

    coordinator
        .synthesize_and_wait()
        .await
        .map_err(CliError::from)?;

    let mut playback = coordinator.playback_updates();
    let duration = playback.borrow().duration;
    println!("Playing {}", format_time(duration.as_secs_f64()));

    tokio::select! {
        _ = playback.wait_for(|s| s.state == PlaybackState::Idle) => {}
        _ = tokio::signal::ctrl_c() => {
            coordinator.stop_playback()?;
        }
    }

    if let Some(filename) = args.save {
        let path = coordinator
            .save_audio_and_wait(filename)
            .await
            .map_err(CliError::from)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
