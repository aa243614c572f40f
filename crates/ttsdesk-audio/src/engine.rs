//! Output engines driven by the transport.
//!
//! The transport only needs to start, pause, reposition and poll a single
//! buffer. [`RodioEngine`] does that against the default output device;
//! tests substitute engines with scripted positions.

use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::decode::DecodedAudio;
use crate::error::AudioError;

/// A single-slot audio output.
///
/// Implementations may hold `!Send` resources; they live on the audio
/// thread for their whole lifetime.
pub trait PlaybackEngine {
    /// Replace whatever is loaded with `audio`, paused at the start.
    fn load(&mut self, audio: DecodedAudio) -> Result<(), AudioError>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop output and release the loaded buffer.
    fn stop(&mut self);

    /// Move to `position`, keeping the paused/playing state.
    fn seek(&mut self, position: Duration) -> Result<(), AudioError>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Whether audio is actively being output.
    fn is_playing(&self) -> bool;
}

/// `rodio` output on the default device.
pub struct RodioEngine {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    audio: Option<DecodedAudio>,
    /// Position of the first sample in the current sink.
    offset: Duration,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::OutputStream(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            audio: None,
            offset: Duration::ZERO,
        })
    }

    /// Rebuild the sink so it starts at `position`.
    fn start_at(&mut self, position: Duration, paused: bool) -> Result<(), AudioError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let Some(audio) = &self.audio else {
            return Ok(());
        };

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::OutputStream(e.to_string()))?;
        if paused {
            sink.pause();
        }
        sink.append(SamplesBuffer::new(
            audio.channels(),
            audio.sample_rate(),
            audio.samples_from(position).to_vec(),
        ));

        self.offset = position;
        self.sink = Some(sink);
        Ok(())
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, audio: DecodedAudio) -> Result<(), AudioError> {
        self.audio = Some(audio);
        self.start_at(Duration::ZERO, true)
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.audio = None;
        self.offset = Duration::ZERO;
        tracing::debug!("Audio playback stopped");
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        let paused = self.sink.as_ref().is_none_or(Sink::is_paused);
        self.start_at(position, paused)
    }

    fn position(&self) -> Duration {
        self.offset + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }
}
