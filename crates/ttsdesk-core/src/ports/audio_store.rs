//! Storage for synthesized audio.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use super::StorageError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioStorePort: Send + Sync {
    /// Write `audio` into the output directory and return the final path.
    ///
    /// `filename` is a bare file name; `None` picks a timestamped default.
    async fn save_audio(
        &self,
        audio: Bytes,
        filename: Option<String>,
    ) -> Result<PathBuf, StorageError>;
}
