use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::client::WikiSource;
use super::error::{WikiError, WikiResult};
use super::model::{RevisionEntry, RevisionId, RevisionPage, RevisionQuery};

/// In-memory [`WikiSource`] with scripted histories and renders.
#[derive(Default)]
pub struct MockWikiSource {
    histories: RwLock<HashMap<String, Vec<RevisionEntry>>>,
    renders: RwLock<HashMap<RevisionId, String>>,
    random_titles: RwLock<Vec<String>>,
    failures_remaining: AtomicU32,
    history_calls: AtomicUsize,
    render_calls: AtomicUsize,
}

impl MockWikiSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a history, newest revision first.
    pub fn with_history(self, title: &str, revisions: Vec<RevisionEntry>) -> Self {
        self.histories.write().insert(title.to_string(), revisions);
        self
    }

    /// Registers `count` revisions with ids `base_id + count - 1 ..= base_id`
    /// (newest first), one per day ending at `newest`.
    pub fn with_linear_history(
        self,
        title: &str,
        base_id: RevisionId,
        count: u64,
        newest: DateTime<Utc>,
    ) -> Self {
        let revisions = (0..count)
            .map(|i| RevisionEntry {
                revision_id: base_id + count - 1 - i,
                timestamp: newest - Duration::days(i as i64),
            })
            .collect();
        self.with_history(title, revisions)
    }

    pub fn with_render(self, revision_id: RevisionId, html: &str) -> Self {
        self.renders.write().insert(revision_id, html.to_string());
        self
    }

    pub fn with_random_title(self, title: &str) -> Self {
        self.random_titles.write().push(title.to_string());
        self
    }

    /// Makes the next `count` calls fail with a 503.
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> WikiResult<()> {
        let injected = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(WikiError::Server {
                status: 503,
                body: "mock outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WikiSource for MockWikiSource {
    async fn revisions(&self, query: &RevisionQuery) -> WikiResult<RevisionPage> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let histories = self.histories.read();
        let Some(history) = histories.get(&query.title) else {
            return Ok(RevisionPage::missing());
        };

        let eligible: Vec<&RevisionEntry> = history
            .iter()
            .filter(|r| query.start.is_none_or(|start| r.timestamp <= start))
            .collect();

        let offset = query
            .continue_token
            .as_deref()
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (offset + query.limit as usize).min(eligible.len());
        let revisions = eligible
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|r| (*r).clone())
            .collect();
        let continue_token = (end < eligible.len()).then(|| end.to_string());

        Ok(RevisionPage {
            missing: false,
            revisions,
            continue_token,
        })
    }

    async fn rendered_html(&self, revision_id: RevisionId) -> WikiResult<Option<String>> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self.renders.read().get(&revision_id).cloned())
    }

    async fn random_title(&self) -> WikiResult<Option<String>> {
        self.take_failure()?;
        Ok(self.random_titles.read().first().cloned())
    }
}
