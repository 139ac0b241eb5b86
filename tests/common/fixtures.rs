//! Canned wiki histories, renders and model answers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use noteworthy::alignment::AlignmentRepository;
use noteworthy::decision::DecisionEngine;
use noteworthy::extract::LeadExtractor;
use noteworthy::model::{MockModelBackend, ResilientInvoker, RetryPolicy};
use noteworthy::session::ComparisonSession;
use noteworthy::wiki::{MockWikiSource, RevisionResolver, WikiSource};

pub const TITLE: &str = "Example";
pub const NEWEST_ID: u64 = 1_119;

pub const CURRENT_HTML: &str = r#"<style>.lead{}</style>
<table class="infobox vcard"><tr><td><p>Mayor: J. Doe</p></td></tr></table>
<p>Example is a market town in the north of the county.</p>
<p>In 2024 it merged with the neighbouring parish of Sample.</p>
<div class="navbox"><p>Towns in the county</p></div>
<h2 id="History">History</h2>
<p>The town received its charter in 1820.</p>"#;

pub const PREVIOUS_HTML: &str = r#"<p>Example is a market town in the north of the county.</p>
<h2 id="History">History</h2>
<p>The town received its charter in 1820.</p>"#;

pub fn newest() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// 120 daily revisions of "Example"; the current one and the one 50 back are renderable.
pub fn example_wiki() -> MockWikiSource {
    MockWikiSource::new()
        .with_linear_history(TITLE, 1_000, 120, newest())
        .with_render(NEWEST_ID, CURRENT_HTML)
        .with_render(NEWEST_ID - 50, PREVIOUS_HTML)
        .with_random_title(TITLE)
}

/// Heuristic says noteworthy, few-shot says not, the arbiter sides with the heuristic.
pub fn split_decision_backend() -> MockModelBackend {
    MockModelBackend::new()
        .respond_when(
            "You are the judge",
            serde_json::json!({"noteworthy": true, "reasoning": "The merger changes what the town is."}),
        )
        .respond_when(
            "Example 1",
            serde_json::json!({"noteworthy": false, "rationale": "The description is unchanged."}),
        )
        .respond_when(
            "These differences are noteworthy",
            serde_json::json!({"noteworthy": true, "rationale": "A merger with Sample was added."}),
        )
}

pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        backoff_factor: 2.0,
        jitter: 0.0,
    }
}

pub fn session(
    wiki: Arc<dyn WikiSource>,
    backend: Arc<MockModelBackend>,
    alignments: Arc<dyn AlignmentRepository>,
) -> ComparisonSession {
    ComparisonSession::new(
        RevisionResolver::new(wiki.clone()),
        LeadExtractor::new(wiki),
        DecisionEngine::new(ResilientInvoker::new(backend, fast_policy()), alignments),
    )
}
