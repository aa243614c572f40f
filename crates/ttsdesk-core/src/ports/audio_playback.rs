//! Audio playback port.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;

use super::PlaybackError;
use crate::domain::PlaybackSnapshot;

/// Transport control over a single playback slot.
///
/// Loading new audio replaces whatever was playing.
#[cfg_attr(test, mockall::automock)]
pub trait AudioPlaybackPort: Send + Sync {
    /// Decode `audio` and start playing it. Returns its duration.
    fn play(&self, audio: Bytes) -> Result<Duration, PlaybackError>;

    fn pause(&self);

    fn resume(&self);

    /// Stop and return to idle with position and progress reset.
    fn stop(&self);

    /// Seek to an absolute position, clamped to the loaded duration.
    fn seek(&self, position: Duration);

    /// Seek to a fraction of the loaded duration, clamped to `[0, 1]`.
    fn seek_fraction(&self, fraction: f64);

    fn snapshot(&self) -> PlaybackSnapshot;

    /// Receiver that observes every published snapshot.
    fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot>;
}
