#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod process;
pub mod store;
pub mod system;

pub use process::{ProcessSupervisor, SupervisorConfig};
pub use store::FileAudioStore;
pub use system::{PythonInstallation, check_tts_installed, discover_python_installations};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
