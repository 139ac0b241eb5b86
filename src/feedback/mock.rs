use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{FeedbackError, FeedbackResult};
use super::record::{FeedbackEntry, Split, StoredFeedback};
use super::store::{FeedbackStore, WriteClock, feedback_id};

/// [`FeedbackStore`] held in memory, oldest entry first.
#[derive(Default)]
pub struct InMemoryFeedbackStore {
    entries: RwLock<Vec<StoredFeedback>>,
    clock: WriteClock,
    append_failures: AtomicU32,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` appends fail with an I/O error.
    pub fn fail_next_appends(&self, count: u32) {
        self.append_failures.store(count, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<StoredFeedback> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn latest(&self) -> FeedbackResult<Option<StoredFeedback>> {
        Ok(self.entries.read().last().cloned())
    }

    async fn append(&self, split: Split, entry: &FeedbackEntry) -> FeedbackResult<StoredFeedback> {
        let failing = self
            .append_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FeedbackError::Io {
                path: PathBuf::from("memory"),
                source: std::io::Error::other("disk full"),
            });
        }

        let written_at = self.clock.next();
        let stored = StoredFeedback {
            id: feedback_id(split, written_at),
            split,
            written_at,
            entry: entry.clone(),
        };
        self.entries.write().push(stored.clone());
        Ok(stored)
    }

    async fn remove(&self, id: &str) -> FeedbackResult<()> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|stored| stored.id != id);
        if entries.len() == before {
            return Err(FeedbackError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn all(&self) -> FeedbackResult<Vec<StoredFeedback>> {
        Ok(self.snapshot())
    }
}
