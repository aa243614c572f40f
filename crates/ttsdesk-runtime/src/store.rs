//! Filesystem store for synthesized audio.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use ttsdesk_core::{AudioStorePort, StorageError};

/// Upper bound on `_N` suffixes tried before giving up.
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Writes audio files into one output directory.
///
/// Existing files are never overwritten: a colliding name gets a `_1`,
/// `_2`, … suffix before its extension.
#[derive(Debug, Clone)]
pub struct FileAudioStore {
    dir: PathBuf,
}

impl FileAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_unique(&self, name: &str, audio: &[u8]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_failed(&self.dir, &e))?;

        let (stem, ext) = split_name(name);
        for n in 0..=MAX_COLLISION_SUFFIX {
            let candidate = if n == 0 {
                self.dir.join(name)
            } else {
                self.dir.join(format!("{stem}_{n}{ext}"))
            };

            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await;
            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %candidate.display(), "file exists, trying next name");
                    continue;
                }
                Err(e) => return Err(write_failed(&candidate, &e)),
            };

            file.write_all(audio)
                .await
                .map_err(|e| write_failed(&candidate, &e))?;
            file.flush()
                .await
                .map_err(|e| write_failed(&candidate, &e))?;
            return Ok(candidate);
        }

        Err(StorageError::WriteFailed {
            path: self.dir.join(name),
            message: "too many files with this name".to_string(),
        })
    }
}

#[async_trait]
impl AudioStorePort for FileAudioStore {
    async fn save_audio(
        &self,
        audio: Bytes,
        filename: Option<String>,
    ) -> Result<PathBuf, StorageError> {
        let name = match filename {
            Some(name) => validate_filename(name)?,
            None => default_filename(),
        };

        let path = self.write_unique(&name, &audio).await?;
        info!(path = %path.display(), bytes = audio.len(), "saved audio");
        Ok(path)
    }
}

/// `tts_<unix seconds>.wav`
pub fn default_filename() -> String {
    format!("tts_{}.wav", Utc::now().timestamp())
}

fn validate_filename(name: String) -> Result<String, StorageError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0')
    {
        return Err(StorageError::InvalidFilename(name));
    }
    Ok(trimmed.to_string())
}

/// Split at the last dot, keeping the dot with the extension.
/// Leading dots belong to the stem.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

fn write_failed(path: &Path, e: &io::Error) -> StorageError {
    StorageError::WriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("speech.wav"), ("speech", ".wav"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("noext"), ("noext", ""));
        assert_eq!(split_name(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_default_filename_pattern() {
        let name = default_filename();
        let secs = name
            .strip_prefix("tts_")
            .and_then(|rest| rest.strip_suffix(".wav"))
            .unwrap();
        assert!(secs.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["", "  ", ".", "..", "a/b.wav", "..\\x.wav", "/etc/passwd"] {
            assert!(
                matches!(
                    validate_filename(bad.to_string()),
                    Err(StorageError::InvalidFilename(_))
                ),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(validate_filename(" ok.wav ".to_string()).unwrap(), "ok.wav");
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAudioStore::new(dir.path().join("nested").join("out"));

        let path = store
            .save_audio(Bytes::from_static(b"RIFF"), Some("hello.wav".to_string()))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("nested/out/hello.wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn test_collisions_get_numbered_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAudioStore::new(dir.path());

        let mut names = Vec::new();
        for i in 0..3u8 {
            let path = store
                .save_audio(Bytes::from(vec![i]), Some("take.wav".to_string()))
                .await
                .unwrap();
            names.push(path.file_name().unwrap().to_string_lossy().into_owned());
        }

        assert_eq!(names, ["take.wav", "take_1.wav", "take_2.wav"]);
        assert_eq!(std::fs::read(dir.path().join("take.wav")).unwrap(), [0]);
    }

    #[tokio::test]
    async fn test_default_name_is_used_without_filename() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAudioStore::new(dir.path());

        let path = store
            .save_audio(Bytes::from_static(b"x"), None)
            .await
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("tts_"));
        assert!(name.ends_with(".wav"));
    }

    #[tokio::test]
    async fn test_invalid_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAudioStore::new(dir.path().join("out"));

        let err = store
            .save_audio(Bytes::from_static(b"x"), Some("../escape.wav".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidFilename(_)));
        assert!(!dir.path().join("out").exists());
    }
}
