#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    FALLBACK_MODELS, History, HistoryItem, HistoryPolicy, LogBuffer, LogLine, LogStream,
    PlaybackSnapshot, PlaybackState, ServerLaunch, ServerProcessState, SynthesisRequest,
    VoiceCloneRequest, format_time, is_voice_clone_model,
};
pub use events::{
    SupervisorEvent, SupervisorEventReceiver, SupervisorEventSender, supervisor_channel,
};
pub use ports::{
    AudioPlaybackPort, AudioStorePort, PlaybackError, ProcessError, ProcessSupervisorPort,
    StorageError, SynthesisClientPort, SynthesisError, ValidationError,
};
pub use services::{
    CoordinatorDeps, CoordinatorError, CoordinatorHandle, CoordinatorState, ServerPhase,
    spawn_coordinator,
};
pub use settings::{Settings, SettingsError, validate_settings};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
