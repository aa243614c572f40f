//! Python interpreter discovery.
//!
//! The TTS server is a Python module, so the launcher needs an interpreter
//! that can import it. Discovery looks at `PATH`, the usual system
//! locations, and per-user pyenv/conda installs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::commands::{get_command_version, parse_python_version};

/// Interpreter names looked up on `PATH`, in preference order.
const PATH_CANDIDATES: &[&str] = &["python3", "python"];

/// Well-known system locations.
const SYSTEM_LOCATIONS: &[&str] = &[
    "/usr/bin/python3",
    "/usr/local/bin/python3",
    "/opt/homebrew/bin/python3",
    "/opt/local/bin/python3",
];

/// Locations relative to the home directory.
const HOME_LOCATIONS: &[&str] = &[
    ".pyenv/shims/python3",
    "miniconda3/bin/python3",
    "anaconda3/bin/python3",
];

/// A discovered interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonInstallation {
    pub path: PathBuf,
    /// e.g. "3.11.6", when the interpreter answered `--version`.
    pub version: Option<String>,
}

/// Candidate interpreter paths that exist on this machine, deduplicated,
/// in discovery order.
pub fn python_candidates() -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let path_hits = PATH_CANDIDATES
        .iter()
        .filter_map(|name| which::which(name).ok());
    let system = SYSTEM_LOCATIONS.iter().map(PathBuf::from);
    let per_user = home
        .iter()
        .flat_map(|home| HOME_LOCATIONS.iter().map(move |rel| home.join(rel)));

    dedup_existing(path_hits.chain(system).chain(per_user))
}

fn dedup_existing(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .filter(|p| p.is_file())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Find interpreters and ask each for its version.
pub async fn discover_python_installations() -> Vec<PythonInstallation> {
    let mut found = Vec::new();
    for path in python_candidates() {
        let version = get_command_version(&path, "--version")
            .await
            .as_deref()
            .and_then(parse_python_version);
        debug!(path = %path.display(), ?version, "found python interpreter");
        found.push(PythonInstallation { path, version });
    }
    found
}

/// Whether `python` can import the `TTS` package.
pub async fn check_tts_installed(python: &Path) -> bool {
    let status = Command::new(python)
        .args(["-c", "import TTS; print(TTS.__version__)"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => status.success(),
        Err(e) => {
            debug!(python = %python.display(), error = %e, "could not run interpreter");
            false
        }
    }
}
