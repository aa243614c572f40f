//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (processes, HTTP, audio devices).
//!
//! # Structure
//!
//! - `request` - Synthesis and voice-clone requests, model families
//! - `history` - Retained synthesis results
//! - `logs` - Server log lines and the bounded log buffer
//! - `server` - Server process state and launch description
//! - `playback` - Playback transport snapshots

mod history;
mod logs;
mod playback;
mod request;
mod server;

pub use history::{History, HistoryItem, HistoryPolicy};
pub use logs::{LOG_BUFFER_CAPACITY, LOG_EVICTION_BATCH, LogBuffer, LogLine, LogStream};
pub use playback::{PlaybackSnapshot, PlaybackState, format_time};
pub use request::{
    DEFAULT_LANGUAGE, FALLBACK_LANGUAGES, FALLBACK_MODELS, MAX_SPEED, MIN_SPEED, NEUTRAL_SPEED, SynthesisRequest, VoiceCloneRequest,
    clamp_speed, is_voice_clone_model,
};
pub use server::{ServerLaunch, ServerProcessState};
