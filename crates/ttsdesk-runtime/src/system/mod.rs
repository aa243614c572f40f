//! Host system probes.

mod commands;
mod python;

pub use commands::get_command_version;
pub use python::{
    PythonInstallation, check_tts_installed, discover_python_installations, python_candidates,
};
