//! Main CLI parser and top-level argument handling.
//!
//! Global options override the matching `Settings` fields and can also be
//! supplied through `TTSDESK_*` environment variables (or a `.env` file).

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for driving a local Coqui TTS server.
#[derive(Parser)]
#[command(name = "ttsdesk")]
#[command(about = "Run a local text-to-speech server and speak through it")]
#[command(version)]
pub struct Cli {
    /// Port the TTS server listens on
    #[arg(long, global = true, env = "TTSDESK_PORT")]
    pub port: Option<u16>,

    /// Python interpreter that runs the server
    #[arg(long, global = true, env = "TTSDESK_PYTHON")]
    pub python: Option<String>,

    /// Directory for saved audio
    #[arg(long = "output-dir", global = true, env = "TTSDESK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait for the server to become ready
    #[arg(long = "startup-timeout", global = true, env = "TTSDESK_STARTUP_TIMEOUT")]
    pub startup_timeout: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
