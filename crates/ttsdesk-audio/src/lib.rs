#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod decode;
pub mod engine;
pub mod error;
pub mod playback;
pub mod transport;

// ============================================================================
// Public API
// ============================================================================

pub use decode::{DecodedAudio, decode_bytes};
pub use engine::{PlaybackEngine, RodioEngine};
pub use error::AudioError;
pub use playback::{AudioPlayback, TICK_INTERVAL};
pub use transport::{END_TOLERANCE, Transport};
pub use ttsdesk_core::format_time;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
