//! Audio error types.

use ttsdesk_core::PlaybackError;

/// Errors raised while decoding or playing audio.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Failed to open the audio output device.
    #[error("Failed to open audio output stream: {0}")]
    OutputStream(String),

    /// The bytes are not audio we can decode.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// IO error (reading an audio file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The audio thread exited.
    #[error("Audio thread has shut down")]
    AudioThreadDied,
}

impl From<AudioError> for PlaybackError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::OutputStream(message) => Self::OutputUnavailable(message),
            AudioError::Decode(message) => Self::DecodeFailed(message),
            AudioError::Io(e) => Self::DecodeFailed(e.to_string()),
            AudioError::AudioThreadDied => Self::AudioThreadDied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_port_errors() {
        assert_eq!(
            PlaybackError::from(AudioError::Decode("bad header".to_string())),
            PlaybackError::DecodeFailed("bad header".to_string())
        );
        assert_eq!(
            PlaybackError::from(AudioError::OutputStream("no device".to_string())),
            PlaybackError::OutputUnavailable("no device".to_string())
        );
        assert_eq!(
            PlaybackError::from(AudioError::AudioThreadDied),
            PlaybackError::AudioThreadDied
        );
    }
}
