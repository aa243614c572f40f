//! Decoding audio bytes into interleaved `f32` samples.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use rodio::{Decoder, Source};

use crate::error::AudioError;

/// Fully decoded audio, cheap to clone.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    channels: u16,
    sample_rate: u32,
    /// Interleaved samples.
    samples: Arc<[f32]>,
}

impl DecodedAudio {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Result<Self, AudioError> {
        if channels == 0 || sample_rate == 0 {
            return Err(AudioError::Decode(format!(
                "unsupported format: {channels} channels at {sample_rate} Hz"
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
            samples: samples.into(),
        })
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    pub fn duration(&self) -> Duration {
        #[allow(clippy::cast_precision_loss)]
        let frames = self.frames() as f64;
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }

    /// Samples from `position` to the end, aligned to a frame boundary.
    pub fn samples_from(&self, position: Duration) -> &[f32] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frame = (position.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        let start = frame
            .saturating_mul(usize::from(self.channels))
            .min(self.samples.len());
        &self.samples[start..]
    }
}

/// Decode a complete audio file held in memory.
pub fn decode_bytes(audio: Bytes) -> Result<DecodedAudio, AudioError> {
    let decoder = Decoder::new(Cursor::new(audio)).map_err(|e| AudioError::Decode(e.to_string()))?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples().collect();

    tracing::debug!(channels, sample_rate, samples = samples.len(), "decoded audio");
    DecodedAudio::new(channels, sample_rate, samples)
}

#[cfg(test)]
pub(crate) mod testing {
    /// A 16-bit PCM WAV file.
    pub fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = u32::try_from(samples.len() * 2).unwrap();
        let block_align = channels * 2;
        let byte_rate = sample_rate * u32::from(block_align);

        let mut out = Vec::with_capacity(44 + samples.len() * 2);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::testing::wav_bytes;
    use super::*;

    #[test]
    fn test_decode_wav() {
        let wav = wav_bytes(1, 8000, &vec![0i16; 8000]);
        let audio = decode_bytes(Bytes::from(wav)).unwrap();

        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.frames(), 8000);
        assert_eq!(audio.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_stereo_duration_counts_frames() {
        let wav = wav_bytes(2, 4000, &vec![0i16; 8000]);
        let audio = decode_bytes(Bytes::from(wav)).unwrap();
        assert_eq!(audio.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_bytes(Bytes::from_static(b"definitely not audio")).unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn test_samples_from_aligns_to_frames() {
        let audio = DecodedAudio::new(2, 10, (0..40).map(|i| i as f32).collect()).unwrap();
        assert_eq!(audio.samples_from(Duration::ZERO).len(), 40);
        assert_eq!(audio.samples_from(Duration::from_millis(500))[0], 10.0);
        assert!(audio.samples_from(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_rejects_zero_rate() {
        assert!(DecodedAudio::new(1, 0, vec![]).is_err());
    }
}
