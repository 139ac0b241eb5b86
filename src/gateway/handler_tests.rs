use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::alignment::InMemoryAlignmentRepository;
use crate::decision::DecisionEngine;
use crate::extract::LeadExtractor;
use crate::feedback::{FeedbackDeduplicator, InMemoryFeedbackStore};
use crate::gateway::{HandlerState, STATUS_HEADER, create_router_with_state};
use crate::model::{MockModelBackend, ResilientInvoker, RetryPolicy};
use crate::session::ComparisonSession;
use crate::wiki::{MockWikiSource, RevisionResolver};

struct Harness {
    router: Router,
    wiki: Arc<MockWikiSource>,
    backend: Arc<MockModelBackend>,
    store: Arc<InMemoryFeedbackStore>,
}

fn harness_with(wiki: MockWikiSource, alignments: InMemoryAlignmentRepository) -> Harness {
    let wiki = Arc::new(wiki);
    let backend = Arc::new(
        MockModelBackend::new()
            .respond_when(
                "You are the judge",
                serde_json::json!({"noteworthy": true, "reasoning": "A merger was reported."}),
            )
            .respond_when(
                "Example 1",
                serde_json::json!({"noteworthy": false, "rationale": "Only wording changed."}),
            )
            .respond_when(
                "These differences are noteworthy",
                serde_json::json!({"noteworthy": true, "rationale": "A merger was added."}),
            ),
    );
    let store = Arc::new(InMemoryFeedbackStore::new());

    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        backoff_factor: 2.0,
        jitter: 0.0,
    };
    let session = ComparisonSession::new(
        RevisionResolver::new(wiki.clone()),
        LeadExtractor::new(wiki.clone()),
        DecisionEngine::new(
            ResilientInvoker::new(backend.clone(), policy),
            Arc::new(alignments),
        ),
    );
    let state = HandlerState::new(session, FeedbackDeduplicator::new(store.clone()));

    Harness {
        router: create_router_with_state(state),
        wiki,
        backend,
        store,
    }
}

fn example_wiki() -> MockWikiSource {
    let newest = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    MockWikiSource::new()
        .with_linear_history("Example", 1_000, 120, newest)
        .with_render(1_119, "<p>Example merged with Sample in 2024.</p>")
        .with_render(1_069, "<p>Example is a town.</p>")
}

fn harness() -> Harness {
    harness_with(
        example_wiki(),
        InMemoryAlignmentRepository::new().with_round(1, "Weigh facts over wording."),
    )
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn status_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(STATUS_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let h = harness();

    let response = get(&h.router, "/healthz").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "healthy");
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "live");
}

#[tokio::test]
async fn test_random_title() {
    let h = harness_with(
        example_wiki().with_random_title("Example"),
        InMemoryAlignmentRepository::new(),
    );
    let response = get(&h.router, "/v1/random-title").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Example");

    let empty = harness();
    let response = get(&empty.router, "/v1/random-title").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare_returns_report_and_record() {
    let h = harness();

    let response = post_json(
        &h.router,
        "/v1/compare",
        serde_json::json!({"title": "Example", "number": 50, "units": "revisions"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "Moderate");
    let body = body_json(response).await;
    assert_eq!(
        body["report"]["revisions_behind"],
        serde_json::json!({"kind": "exact", "revisions": 50})
    );
    assert_eq!(body["report"]["confidence"], "Moderate");
    assert!(body["report"]["session_id"].is_string());
    assert_eq!(body["record"]["noteworthy_differences"], "True");
    assert_eq!(
        body["record"]["old_timestamp"],
        "**Timestamp:** 2025-04-12T12:00:00Z, 50 revisions behind"
    );
    assert_eq!(h.backend.calls(), 3);
}

#[tokio::test]
async fn test_compare_error_statuses() {
    let h = harness();

    let cases = [
        (serde_json::json!({"number": 5}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"title": "Example", "units": "weeks"}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"title": "Example", "number": 500}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"title": "Nowhere"}), StatusCode::NOT_FOUND),
        (serde_json::json!({"title": "Example", "number": 300}), StatusCode::NOT_FOUND),
    ];
    for (body, expected) in cases {
        let response = post_json(&h.router, "/v1/compare", body.clone()).await;
        assert_eq!(response.status(), expected, "{body}");
        let error = body_json(response).await;
        assert_eq!(error["code"], expected.as_u16());
    }
}

#[tokio::test]
async fn test_compare_without_alignment_round_is_server_error() {
    let h = harness_with(example_wiki(), InMemoryAlignmentRepository::new());

    let response = post_json(
        &h.router,
        "/v1/compare",
        serde_json::json!({"title": "Example", "mode": "aligned-heuristic"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status_header(&response), "configuration_error");
}

#[tokio::test]
async fn test_backend_outages_are_bad_gateway() {
    let h = harness();
    h.wiki.fail_next(1);
    let response = post_json(&h.router, "/v1/compare", serde_json::json!({"title": "Example"})).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let h = harness();
    h.backend.fail_next(10);
    let response = post_json(&h.router, "/v1/compare", serde_json::json!({"title": "Example"})).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(status_header(&response), "upstream_error");
}

#[tokio::test]
async fn test_feedback_saved_then_retracted() {
    let h = harness();
    let compared = body_json(
        post_json(&h.router, "/v1/compare", serde_json::json!({"title": "Example"})).await,
    )
    .await;
    let submission = serde_json::json!({"record": compared["record"], "feedback": "agree"});

    let first = post_json(&h.router, "/v1/feedback", submission.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["action"], "saved");
    assert_eq!(h.store.len(), 1);

    let second = post_json(&h.router, "/v1/feedback", submission).await;
    assert_eq!(body_json(second).await["action"], "retracted");
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_feedback_opposite_value_updates() {
    let h = harness();
    let compared = body_json(
        post_json(&h.router, "/v1/compare", serde_json::json!({"title": "Example"})).await,
    )
    .await;

    post_json(
        &h.router,
        "/v1/feedback",
        serde_json::json!({"record": compared["record"], "feedback": "agree"}),
    )
    .await;
    let response = post_json(
        &h.router,
        "/v1/feedback",
        serde_json::json!({"record": compared["record"], "feedback": "disagree"}),
    )
    .await;

    assert_eq!(body_json(response).await["action"], "updated");
    let stored = h.store.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].entry.feedback.as_str(), "disagree");
}

#[tokio::test]
async fn test_feedback_rejects_bad_bodies() {
    let h = harness();

    let response = post_json(
        &h.router,
        "/v1/feedback",
        serde_json::json!({"record": {"page_title": "Example"}, "feedback": "agree"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let compared = body_json(
        post_json(&h.router, "/v1/compare", serde_json::json!({"title": "Example"})).await,
    )
    .await;
    let mut record = compared["record"].clone();
    record["page_title"] = serde_json::json!("  ");
    let response = post_json(
        &h.router,
        "/v1/feedback",
        serde_json::json!({"record": record, "feedback": "agree"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.store.is_empty());
}
