use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::constants::DEFAULT_TEST_SPLIT_PROBABILITY;

use super::error::FeedbackResult;
use super::record::{FeedbackEntry, FeedbackRecord, FeedbackValue, Split};
use super::store::FeedbackStore;

/// Outcome of a feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubmitAction {
    /// A new session; written to `split`.
    Saved { id: String, split: Split },
    /// Same session, opposite value; `replaced` was removed and `id` written.
    Updated {
        id: String,
        replaced: String,
        split: Split,
    },
    /// Same session, same value; the stored entry was removed and nothing saved.
    Retracted { id: String },
}

/// Decides between saving, updating and retracting feedback.
///
/// Submissions are compared with the most recent stored entry only. The
/// read-compare-write sequence runs under one lock per deduplicator, so share
/// a single instance between all writers of a store.
pub struct FeedbackDeduplicator {
    store: Arc<dyn FeedbackStore>,
    write_lock: Mutex<()>,
    test_probability: f64,
}

impl FeedbackDeduplicator {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            test_probability: DEFAULT_TEST_SPLIT_PROBABILITY,
        }
    }

    /// Probability of assigning a new entry to [`Split::Test`], clamped to `[0, 1]`.
    pub fn with_test_probability(mut self, probability: f64) -> Self {
        self.test_probability = if probability.is_nan() {
            DEFAULT_TEST_SPLIT_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn store(&self) -> &Arc<dyn FeedbackStore> {
        &self.store
    }

    #[instrument(skip(self, record), fields(title = %record.page_title))]
    pub async fn submit(
        &self,
        record: FeedbackRecord,
        feedback: FeedbackValue,
    ) -> FeedbackResult<SubmitAction> {
        let _guard = self.write_lock.lock().await;

        let key = record.comparison_key();
        let fingerprint = key.fingerprint();
        let entry = FeedbackEntry { record, feedback };

        if let Some(previous) = self.store.latest().await? {
            if previous.entry.record.comparison_key() == key {
                if previous.entry.feedback == feedback {
                    self.store.remove(&previous.id).await?;
                    info!(%fingerprint, id = %previous.id, "repeated feedback retracted");
                    return Ok(SubmitAction::Retracted { id: previous.id });
                }

                // The replacement must land before the old entry goes.
                let stored = self.store.append(previous.split, &entry).await?;
                self.store.remove(&previous.id).await?;
                info!(%fingerprint, id = %stored.id, %feedback, "feedback updated");
                return Ok(SubmitAction::Updated {
                    id: stored.id,
                    replaced: previous.id,
                    split: stored.split,
                });
            }
        }

        let split = self.choose_split();
        let stored = self.store.append(split, &entry).await?;
        info!(%fingerprint, id = %stored.id, %feedback, "feedback saved");
        Ok(SubmitAction::Saved {
            id: stored.id,
            split,
        })
    }

    fn choose_split(&self) -> Split {
        if rand::rng().random_bool(self.test_probability) {
            Split::Test
        } else {
            Split::Train
        }
    }
}
