//! Pythons command handler.
//!
//! Lists interpreters found on this machine and whether each can import
//! the `TTS` package, which `serve` needs.

use anyhow::Result;
use ttsdesk_runtime::{check_tts_installed, discover_python_installations};

use crate::presentation::{print_separator, truncate_string};

/// Execute the pythons command.
pub async fn execute() -> Result<()> {
    let installations = discover_python_installations().await;
    if installations.is_empty() {
        println!("No Python interpreters found.");
        println!("Install Python 3 and run: pip install TTS");
        return Ok(());
    }

    println!("{:<50} {:<10} TTS", "Interpreter", "Version");
    print_separator(66);

    for installation in installations {
        let tts = if check_tts_installed(&installation.path).await {
            "yes"
        } else {
            "no"
        };
        println!(
            "{:<50} {:<10} {}",
            truncate_string(&installation.path.display().to_string(), 49),
            installation.version.as_deref().unwrap_or("--"),
            tts
        );
    }

    println!();
    println!("Use --python <path> (or TTSDESK_PYTHON) to pick one.");
    Ok(())
}
