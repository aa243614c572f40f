//! Playback transport snapshots.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Point-in-time view of the playback transport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub position: Duration,
    pub duration: Duration,
    /// `position / duration`, 0 when nothing is loaded.
    pub progress: f64,
}

impl PlaybackSnapshot {
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing)
    }
}

/// Render seconds as `M:SS`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_default_snapshot_is_idle() {
        let snapshot = PlaybackSnapshot::default();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert!(!snapshot.is_playing());
        assert!(snapshot.progress.abs() < f64::EPSILON);
    }
}
