//! Serve command handler.
//!
//! Starts the TTS server through the coordinator and echoes its output
//! until Ctrl+C or until the process dies.

use anyhow::Result;
use tokio::sync::watch;
use ttsdesk_core::{CoordinatorState, ServerPhase};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::LogFollower;

/// Execute the serve command.
pub async fn execute(ctx: &CliContext, model: Option<String>) -> Result<()> {
    let mut state = ctx.coordinator.subscribe();
    let mut follower = LogFollower::default();

    println!(
        "Starting TTS server on port {}... (Press Ctrl+C to stop)",
        ctx.settings.server_port
    );

    let start = ctx.coordinator.start_server_and_wait(model);
    tokio::pin!(start);
    loop {
        tokio::select! {
            result = &mut start => {
                result.map_err(|e| CliError::Server(e.to_string()))?;
                break;
            }
            changed = state.changed() => {
                if changed.is_err() {
                    return Err(CliError::Server("coordinator stopped".into()).into());
                }
                print_logs(&mut state, &mut follower);
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }

    print_logs(&mut state, &mut follower);
    let ready = ctx.coordinator.state();
    println!(
        "Server ready at {} with {}",
        ctx.settings.server_url(),
        ready.selected_model
    );

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                print_logs(&mut state, &mut follower);
                let snapshot = state.borrow().clone();
                if snapshot.phase == ServerPhase::Off {
                    let reason = snapshot
                        .last_error
                        .unwrap_or_else(|| format!("server {}", snapshot.process));
                    return Err(CliError::Server(reason).into());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping server...");
                return Ok(());
            }
        }
    }
}

fn print_logs(state: &mut watch::Receiver<CoordinatorState>, follower: &mut LogFollower) {
    let current = state.borrow_and_update();
    for line in follower.take_new(&current.logs) {
        println!("{line}");
    }
}
