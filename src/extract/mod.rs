//! Lead-section extraction for a specific revision.
//!
//! Renders are fetched by revision id, never by title, so the text for a given
//! id does not change over time. [`LeadExtractor`] therefore memoizes extracts
//! in a bounded in-memory cache.

pub mod lead;


use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, info, instrument};

use crate::constants::DEFAULT_LEAD_CACHE_CAPACITY;
use crate::hashing::hash_to_u64;
use crate::wiki::{RevisionId, WikiResult, WikiSource};

pub use lead::lead_text;

/// Fetches revision-pinned renders and reduces them to lead prose.
#[derive(Clone)]
pub struct LeadExtractor {
    source: Arc<dyn WikiSource>,
    cache: Cache<RevisionId, Option<String>>,
}

impl LeadExtractor {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self::with_capacity(source, DEFAULT_LEAD_CACHE_CAPACITY)
    }

    /// Creates an extractor whose cache holds at most `capacity` revisions.
    pub fn with_capacity(source: Arc<dyn WikiSource>, capacity: u64) -> Self {
        Self {
            source,
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Lead text of `revision_id`.
    ///
    /// `Ok(None)` means the revision cannot be rendered (deleted or
    /// suppressed); `Ok(Some(""))` means the article has no lead prose.
    #[instrument(skip(self))]
    pub async fn extract_lead(&self, revision_id: RevisionId) -> WikiResult<Option<String>> {
        if let Some(cached) = self.cache.get(&revision_id) {
            debug!("lead cache hit");
            return Ok(cached);
        }

        let lead = match self.source.rendered_html(revision_id).await? {
            Some(html) => {
                let lead = lead_text(&html);
                debug!(
                    chars = lead.chars().count(),
                    digest = hash_to_u64(lead.as_bytes()),
                    "lead extracted"
                );
                Some(lead)
            }
            None => {
                info!("revision is not renderable");
                None
            }
        };

        self.cache.insert(revision_id, lead.clone());
        Ok(lead)
    }

    /// Number of cached extracts.
    pub fn cached_len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}
