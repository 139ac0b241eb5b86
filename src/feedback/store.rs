use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::error::{FeedbackError, FeedbackResult};
use super::record::{FeedbackEntry, Split, StoredFeedback};

const WRITE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Append-only collection of feedback entries, keyed by write time.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// The most recently written entry.
    async fn latest(&self) -> FeedbackResult<Option<StoredFeedback>>;

    /// Writes `entry` as a new, independent unit.
    async fn append(&self, split: Split, entry: &FeedbackEntry) -> FeedbackResult<StoredFeedback>;

    async fn remove(&self, id: &str) -> FeedbackResult<()>;

    /// Every entry, oldest first.
    async fn all(&self) -> FeedbackResult<Vec<StoredFeedback>>;
}

/// Storage key for an entry written at `written_at`.
pub fn feedback_id(split: Split, written_at: DateTime<Utc>) -> String {
    format!("{}-{}", split, written_at.format(WRITE_TIME_FORMAT))
}

/// Inverse of [`feedback_id`].
pub fn parse_feedback_id(id: &str) -> Option<(Split, DateTime<Utc>)> {
    let (split, ts) = id.split_once('-')?;
    let split = split.parse().ok()?;
    let written_at = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()?
        .and_utc();
    Some((split, written_at))
}

/// Write times handed out by one store never repeat or go backwards.
#[derive(Default)]
pub(crate) struct WriteClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl WriteClock {
    pub(crate) fn next(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let now = truncate_micros(Utc::now());
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

fn truncate_micros(instant: DateTime<Utc>) -> DateTime<Utc> {
    let micros = instant.timestamp_micros();
    DateTime::from_timestamp_micros(micros).unwrap_or(instant)
}

/// One pretty-printed JSON file per entry, named `{split}-{written_at}.json`.
pub struct FileFeedbackStore {
    dir: PathBuf,
    clock: WriteClock,
}

impl FileFeedbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clock: WriteClock::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> FeedbackError {
        FeedbackError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Ids of all entries on disk, oldest first.
    async fn list(&self) -> FeedbackResult<Vec<(String, Split, DateTime<Utc>)>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.dir, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?
        {
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match parse_feedback_id(id) {
                Some((split, written_at)) => ids.push((id.to_string(), split, written_at)),
                None => debug!(file = id, "ignoring unrecognized file in feedback dir"),
            }
        }

        ids.sort_by_key(|(_, _, written_at)| *written_at);
        Ok(ids)
    }

    async fn load(&self, id: String, split: Split, written_at: DateTime<Utc>) -> FeedbackResult<StoredFeedback> {
        let path = self.path_for(&id);
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FeedbackError::NotFound(id)),
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        let entry = serde_json::from_slice(&body)
            .map_err(|source| FeedbackError::Json { path, source })?;

        Ok(StoredFeedback {
            id,
            split,
            written_at,
            entry,
        })
    }
}

#[async_trait]
impl FeedbackStore for FileFeedbackStore {
    async fn latest(&self) -> FeedbackResult<Option<StoredFeedback>> {
        match self.list().await?.pop() {
            Some((id, split, written_at)) => Ok(Some(self.load(id, split, written_at).await?)),
            None => Ok(None),
        }
    }

    async fn append(&self, split: Split, entry: &FeedbackEntry) -> FeedbackResult<StoredFeedback> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        let body = serde_json::to_vec_pretty(entry).map_err(|source| FeedbackError::Json {
            path: self.dir.clone(),
            source,
        })?;

        let written_at = self.clock.next();
        let id = feedback_id(split, written_at);
        let path = self.path_for(&id);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        file.write_all(&body)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        file.flush().await.map_err(|e| Self::io_error(&path, e))?;

        info!(id = %id, "feedback written");
        Ok(StoredFeedback {
            id,
            split,
            written_at,
            entry: entry.clone(),
        })
    }

    async fn remove(&self, id: &str) -> FeedbackResult<()> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(id, "feedback removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FeedbackError::NotFound(id.to_string())),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn all(&self) -> FeedbackResult<Vec<StoredFeedback>> {
        let mut stored = Vec::new();
        for (id, split, written_at) in self.list().await? {
            stored.push(self.load(id, split, written_at).await?);
        }
        Ok(stored)
    }
}
