//! Playback transport state machine.
//!
//! ```text
//! Idle --load--> Playing <--pause/resume--> Paused
//!   ^               |                          |
//!   +----stop / end of stream------------------+
//! ```
//!
//! Loading always starts playback. `stop` and the end of the stream both
//! return to `Idle` with position and progress reset and the buffer
//! released; the duration of the last item stays visible.

use std::time::Duration;

use ttsdesk_core::{PlaybackSnapshot, PlaybackState};

use crate::decode::DecodedAudio;
use crate::engine::PlaybackEngine;
use crate::error::AudioError;

/// The stream counts as finished once the engine is idle this close to the end.
pub const END_TOLERANCE: Duration = Duration::from_millis(100);

pub struct Transport<E: PlaybackEngine> {
    engine: E,
    state: PlaybackState,
    position: Duration,
    duration: Duration,
    loaded: bool,
}

impl<E: PlaybackEngine> Transport<E> {
    pub const fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            loaded: false,
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Replace the current item with `audio` and start playing it.
    pub fn load_and_play(&mut self, audio: DecodedAudio) -> Result<Duration, AudioError> {
        self.stop();

        let duration = audio.duration();
        self.engine.load(audio)?;
        self.engine.play();

        self.loaded = true;
        self.duration = duration;
        self.position = Duration::ZERO;
        self.state = PlaybackState::Playing;
        tracing::debug!(duration_ms = duration.as_millis(), "playback started");
        Ok(duration)
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.engine.pause();
            self.position = self.engine.position().min(self.duration);
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.engine.play();
            self.state = PlaybackState::Playing;
        }
    }

    pub fn stop(&mut self) {
        if self.loaded {
            self.engine.stop();
        }
        self.loaded = false;
        self.position = Duration::ZERO;
        self.state = PlaybackState::Idle;
    }

    /// Seek to `position`, clamped to the loaded duration.
    pub fn seek(&mut self, position: Duration) {
        if !self.loaded {
            return;
        }
        let position = position.min(self.duration);
        if let Err(e) = self.engine.seek(position) {
            tracing::warn!(error = %e, "seek failed");
            return;
        }
        self.position = position;
    }

    /// Seek to a fraction of the duration, clamped to `[0, 1]`.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek(self.duration.mul_f64(fraction));
    }

    /// Refresh the position from the engine and detect the end of stream.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.position = self.engine.position().min(self.duration);

        if !self.engine.is_playing() && self.position + END_TOLERANCE >= self.duration {
            tracing::debug!("playback finished");
            self.stop();
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let progress = if self.duration.is_zero() {
            0.0
        } else {
            self.position.as_secs_f64() / self.duration.as_secs_f64()
        };
        PlaybackSnapshot {
            state: self.state,
            position: self.position,
            duration: self.duration,
            progress,
        }
    }
}
