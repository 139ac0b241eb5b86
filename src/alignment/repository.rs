use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::{AlignmentError, AlignmentResult};

/// Versioned arbiter guidance, one immutable text per round.
#[async_trait]
pub trait AlignmentRepository: Send + Sync {
    /// The highest round present, if any.
    async fn latest(&self) -> AlignmentResult<Option<u32>>;

    async fn get(&self, round: u32) -> AlignmentResult<String>;

    /// Stores a new round. Fails with [`AlignmentError::RoundExists`] rather than overwrite.
    async fn put(&self, round: u32, text: &str) -> AlignmentResult<()>;
}

/// Rounds stored as `alignment_{round}.txt` in one directory.
pub struct FileAlignmentRepository {
    dir: PathBuf,
}

impl FileAlignmentRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn round_path(&self, round: u32) -> PathBuf {
        self.dir.join(round_file_name(round))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> AlignmentError {
        AlignmentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn round_file_name(round: u32) -> String {
    format!("alignment_{round}.txt")
}

/// Inverse of [`round_file_name`].
pub fn parse_round_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("alignment_")?
        .strip_suffix(".txt")?
        .parse()
        .ok()
}

#[async_trait]
impl AlignmentRepository for FileAlignmentRepository {
    async fn latest(&self) -> AlignmentResult<Option<u32>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.dir, e)),
        };

        let mut latest = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.io_error(&self.dir, e))?
        {
            let name = entry.file_name();
            if let Some(round) = name.to_str().and_then(parse_round_file_name) {
                latest = latest.max(Some(round));
            }
        }

        debug!(dir = %self.dir.display(), ?latest, "scanned alignment rounds");
        Ok(latest)
    }

    async fn get(&self, round: u32) -> AlignmentResult<String> {
        let path = self.round_path(round);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AlignmentError::RoundNotFound(round)),
            Err(e) => Err(self.io_error(&path, e)),
        }
    }

    async fn put(&self, round: u32, text: &str) -> AlignmentResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.io_error(&self.dir, e))?;

        let path = self.round_path(round);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AlignmentError::RoundExists(round));
            }
            Err(e) => return Err(self.io_error(&path, e)),
        };

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| self.io_error(&path, e))?;
        file.flush().await.map_err(|e| self.io_error(&path, e))?;

        info!(round, path = %path.display(), "alignment round written");
        Ok(())
    }
}
