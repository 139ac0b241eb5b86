use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::constants::{DEFAULT_HISTORY_PAGE_SIZE, DEFAULT_MAX_HISTORY_PAGES, MAX_REVISIONS_BACK};

use super::client::WikiSource;
use super::error::{WikiError, WikiResult};
use super::model::{
    HistoryPolicy, RevisionDistance, RevisionId, RevisionQuery, RevisionRef, Units,
};

/// Turns "N revisions back" / "N days back" into concrete revisions.
#[derive(Clone)]
pub struct RevisionResolver {
    source: Arc<dyn WikiSource>,
    policy: HistoryPolicy,
    page_size: u32,
    max_pages: u32,
}

impl RevisionResolver {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self {
            source,
            policy: HistoryPolicy::default(),
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
            max_pages: DEFAULT_MAX_HISTORY_PAGES,
        }
    }

    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the page size and page budget used by [`Self::distance_between`].
    pub fn with_scan_window(mut self, page_size: u32, max_pages: u32) -> Self {
        self.page_size = page_size.max(1);
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn source(&self) -> &Arc<dyn WikiSource> {
        &self.source
    }

    /// The current revision of `title`.
    pub async fn resolve_current(&self, title: &str) -> WikiResult<RevisionRef> {
        self.resolve_by_count(title, 0).await
    }

    /// The `n`-th revision strictly older than the current one.
    ///
    /// Requests a history page of `n + 1` entries and takes the last. When the
    /// article is younger than that, the configured [`HistoryPolicy`] decides
    /// between "not found" and the oldest revision (flagged `clamped`).
    #[instrument(skip(self))]
    pub async fn resolve_by_count(&self, title: &str, n: u32) -> WikiResult<RevisionRef> {
        if n > MAX_REVISIONS_BACK {
            return Err(WikiError::InvalidRequest(format!(
                "cannot look back {n} revisions (maximum {MAX_REVISIONS_BACK})"
            )));
        }

        let page = self
            .source
            .revisions(&RevisionQuery::latest(title, n + 1))
            .await?;
        if page.missing || page.revisions.is_empty() {
            return Ok(RevisionRef::not_found());
        }

        let wanted = n as usize;
        let (index, clamped) = if page.revisions.len() > wanted {
            (wanted, false)
        } else {
            match self.policy {
                HistoryPolicy::Strict => {
                    info!(
                        available = page.revisions.len(),
                        requested = n,
                        "history shorter than requested"
                    );
                    return Ok(RevisionRef::not_found());
                }
                HistoryPolicy::Clamp => {
                    let oldest = page.revisions.len() - 1;
                    warn!(requested = n, reached = oldest, "clamping to oldest revision");
                    (oldest, true)
                }
            }
        };

        let entry = &page.revisions[index];
        Ok(RevisionRef {
            revision_id: Some(entry.revision_id),
            timestamp: Some(entry.timestamp),
            revision_index: Some(index as u32),
            clamped,
        })
    }

    /// The revision that was current `days` days ago.
    pub async fn resolve_by_age(&self, title: &str, days: u32) -> WikiResult<RevisionRef> {
        self.resolve_by_age_at(title, days, Utc::now()).await
    }

    /// Like [`Self::resolve_by_age`], measured from `now`.
    #[instrument(skip(self))]
    pub async fn resolve_by_age_at(
        &self,
        title: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> WikiResult<RevisionRef> {
        let Some(target) = now.checked_sub_signed(Duration::days(i64::from(days))) else {
            debug!(days, "age lookup predates representable time");
            return Ok(RevisionRef::not_found());
        };
        let page = self
            .source
            .revisions(&RevisionQuery::at_or_before(title, target))
            .await?;

        match page.revisions.first() {
            Some(entry) if !page.missing => Ok(RevisionRef {
                revision_id: Some(entry.revision_id),
                timestamp: Some(entry.timestamp),
                revision_index: None,
                clamped: false,
            }),
            _ => Ok(RevisionRef::not_found()),
        }
    }

    /// Counts how many revisions separate `revision_id` from the current one.
    ///
    /// Scans history newest-first in pages of `page_size`, stopping at the
    /// first match. If the revision is not seen within `max_pages` pages (or
    /// the history ends first), the result is `AtLeast(scanned)`.
    #[instrument(skip(self))]
    pub async fn distance_between(
        &self,
        title: &str,
        revision_id: RevisionId,
    ) -> WikiResult<RevisionDistance> {
        let mut scanned: u64 = 0;
        let mut token: Option<String> = None;

        for page_number in 0..self.max_pages {
            let query = RevisionQuery::latest(title, self.page_size).continued(token.take());
            let page = self.source.revisions(&query).await?;
            if page.missing {
                return Ok(RevisionDistance::PageMissing);
            }

            for entry in &page.revisions {
                if entry.revision_id == revision_id {
                    debug!(distance = scanned, pages = page_number + 1, "revision located");
                    return Ok(RevisionDistance::Exact(scanned));
                }
                scanned += 1;
            }

            match page.continue_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!(scanned, "revision not located within scan window");
        Ok(RevisionDistance::AtLeast(scanned))
    }

    /// Distance of an already-resolved previous revision from the current one.
    ///
    /// Count lookups already know their ordinal; age lookups have to scan.
    pub async fn revisions_behind(
        &self,
        title: &str,
        units: Units,
        previous: &RevisionRef,
    ) -> WikiResult<RevisionDistance> {
        match (units, previous.revision_index, previous.revision_id) {
            (Units::Revisions, Some(index), _) => Ok(RevisionDistance::Exact(u64::from(index))),
            (_, _, Some(revision_id)) => self.distance_between(title, revision_id).await,
            (_, _, None) => Ok(RevisionDistance::PageMissing),
        }
    }

    /// A random article title.
    pub async fn random_title(&self) -> WikiResult<Option<String>> {
        self.source.random_title().await
    }
}
