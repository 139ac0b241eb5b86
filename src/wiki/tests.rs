use super::*;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn newest() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap()
}

fn linear_source(count: u64) -> Arc<MockWikiSource> {
    Arc::new(MockWikiSource::new().with_linear_history("Example", 1000, count, newest()))
}

fn resolver(source: Arc<MockWikiSource>) -> RevisionResolver {
    RevisionResolver::new(source)
}

#[tokio::test]
async fn test_count_zero_matches_current() {
    let resolver = resolver(linear_source(20));

    let current = resolver.resolve_current("Example").await.unwrap();
    let zero = resolver.resolve_by_count("Example", 0).await.unwrap();

    assert_eq!(current.revision_id, zero.revision_id);
    assert_eq!(current.revision_id, Some(1019));
    assert_eq!(current.revision_index, Some(0));
}

#[tokio::test]
async fn test_count_selects_nth_older_revision() {
    let resolver = resolver(linear_source(120));

    let rev = resolver.resolve_by_count("Example", 50).await.unwrap();

    assert_eq!(rev.revision_id, Some(1119 - 50));
    assert_eq!(rev.revision_index, Some(50));
    assert_eq!(rev.timestamp, Some(newest() - chrono::Duration::days(50)));
    assert!(!rev.clamped);
}

#[tokio::test]
async fn test_distance_matches_count_lookup() {
    let resolver = resolver(linear_source(200));

    for n in [0u32, 1, 10, 50, 199] {
        let rev = resolver.resolve_by_count("Example", n).await.unwrap();
        let distance = resolver
            .distance_between("Example", rev.revision_id.unwrap())
            .await
            .unwrap();
        assert_eq!(distance, RevisionDistance::Exact(u64::from(n)), "n = {n}");
    }
}

#[tokio::test]
async fn test_strict_policy_reports_short_history_as_not_found() {
    let resolver = resolver(linear_source(5));

    let rev = resolver.resolve_by_count("Example", 10).await.unwrap();

    assert!(!rev.is_found());
    assert_eq!(rev, RevisionRef::not_found());
}

#[tokio::test]
async fn test_clamp_policy_returns_oldest_with_actual_ordinal() {
    let resolver = resolver(linear_source(5)).with_policy(HistoryPolicy::Clamp);

    let rev = resolver.resolve_by_count("Example", 10).await.unwrap();

    assert!(rev.clamped);
    assert_eq!(rev.revision_id, Some(1000));
    assert_eq!(rev.revision_index, Some(4));
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let resolver = resolver(linear_source(5));

    let rev = resolver.resolve_current("No_such_article").await.unwrap();
    assert!(!rev.is_found());

    let rev = resolver
        .resolve_by_age_at("No_such_article", 3, newest())
        .await
        .unwrap();
    assert!(!rev.is_found());
}

#[tokio::test]
async fn test_count_beyond_api_limit_is_rejected() {
    let resolver = resolver(linear_source(5));

    let err = resolver.resolve_by_count("Example", 500).await.unwrap_err();
    assert!(matches!(err, WikiError::InvalidRequest(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_age_lookup_picks_revision_in_effect() {
    let resolver = resolver(linear_source(30));

    let rev = resolver
        .resolve_by_age_at("Example", 3, newest())
        .await
        .unwrap();

    assert_eq!(rev.revision_id, Some(1029 - 3));
    assert_eq!(rev.revision_index, None);
}

#[tokio::test]
async fn test_age_lookup_before_creation_is_not_found() {
    let resolver = resolver(linear_source(30));

    let rev = resolver
        .resolve_by_age_at("Example", 365, newest())
        .await
        .unwrap();

    assert!(!rev.is_found());
}

#[tokio::test]
async fn test_age_lookup_beyond_calendar_range_is_not_found() {
    let source = linear_source(30);
    let resolver = resolver(source.clone());

    let rev = resolver
        .resolve_by_age_at("Example", 200_000_000, newest())
        .await
        .unwrap();

    assert!(!rev.is_found());
    assert_eq!(source.history_calls(), 0);
}

#[tokio::test]
async fn test_distance_spans_multiple_pages() {
    let resolver = resolver(linear_source(100)).with_scan_window(10, 3);

    let distance = resolver.distance_between("Example", 1099 - 25).await.unwrap();

    assert_eq!(distance, RevisionDistance::Exact(25));
}

#[tokio::test]
async fn test_distance_outside_window_is_at_least_scanned() {
    let source = linear_source(100);
    let resolver = resolver(source.clone()).with_scan_window(10, 3);

    let distance = resolver.distance_between("Example", 1099 - 40).await.unwrap();

    assert_eq!(distance, RevisionDistance::AtLeast(30));
    assert_eq!(distance.legacy_value(), Some(-30));
    assert_eq!(distance.to_string(), ">30");
    assert_eq!(source.history_calls(), 3);
}

#[tokio::test]
async fn test_distance_when_history_ends_without_match() {
    let resolver = resolver(linear_source(15)).with_scan_window(10, 5);

    let distance = resolver.distance_between("Example", 42).await.unwrap();

    assert_eq!(distance, RevisionDistance::AtLeast(15));
}

#[tokio::test]
async fn test_distance_for_missing_page() {
    let resolver = resolver(linear_source(15));

    let distance = resolver.distance_between("Nope", 1).await.unwrap();

    assert_eq!(distance, RevisionDistance::PageMissing);
    assert_eq!(distance.legacy_value(), None);
}

#[tokio::test]
async fn test_revisions_behind_uses_known_ordinal_for_counts() {
    let source = linear_source(60);
    let resolver = resolver(source.clone());

    let rev = resolver.resolve_by_count("Example", 50).await.unwrap();
    let calls = source.history_calls();
    let behind = resolver
        .revisions_behind("Example", Units::Revisions, &rev)
        .await
        .unwrap();

    assert_eq!(behind, RevisionDistance::Exact(50));
    assert_eq!(source.history_calls(), calls);
}

#[tokio::test]
async fn test_revisions_behind_scans_for_age_lookups() {
    let resolver = resolver(linear_source(60));

    let rev = resolver
        .resolve_by_age_at("Example", 7, newest())
        .await
        .unwrap();
    let behind = resolver
        .revisions_behind("Example", Units::Days, &rev)
        .await
        .unwrap();

    assert_eq!(behind, RevisionDistance::Exact(7));
}

#[tokio::test]
async fn test_transport_failure_is_propagated() {
    let source = linear_source(10);
    source.fail_next(1);
    let resolver = resolver(source);

    let err = resolver.resolve_current("Example").await.unwrap_err();

    assert!(err.is_retryable());
    assert!(resolver.resolve_current("Example").await.unwrap().is_found());
}

#[test]
fn test_revision_distance_parsing() {
    assert_eq!("50".parse::<RevisionDistance>(), Ok(RevisionDistance::Exact(50)));
    assert_eq!(">500".parse::<RevisionDistance>(), Ok(RevisionDistance::AtLeast(500)));
    assert_eq!("-500".parse::<RevisionDistance>(), Ok(RevisionDistance::AtLeast(500)));
    assert_eq!("unknown".parse::<RevisionDistance>(), Ok(RevisionDistance::PageMissing));
    assert!("lots".parse::<RevisionDistance>().is_err());
}

#[test]
fn test_units_parsing() {
    assert_eq!("revisions".parse::<Units>(), Ok(Units::Revisions));
    assert_eq!("Days".parse::<Units>(), Ok(Units::Days));
    assert!("weeks".parse::<Units>().is_err());
    assert_eq!(Units::Days.to_string(), "days");
}

async fn client_for(server: &MockServer) -> MediaWikiClient {
    MediaWikiClient::new(&format!("{}/w/api.php", server.uri()), "noteworthy-tests/0.1").unwrap()
}

#[tokio::test]
async fn test_client_parses_revision_page_with_continuation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "revisions"))
        .and(query_param("rvlimit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "continue": {"rvcontinue": "20251101000000|111", "continue": "||"},
            "query": {"pages": {"736": {
                "pageid": 736, "ns": 0, "title": "Example",
                "revisions": [
                    {"revid": 222, "parentid": 111, "timestamp": "2025-11-02T10:00:00Z"},
                    {"revid": 111, "parentid": 100, "timestamp": "2025-11-01T09:30:00Z"}
                ]
            }}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .revisions(&RevisionQuery::latest("Example", 2))
        .await
        .unwrap();

    assert!(!page.missing);
    assert_eq!(page.revisions.len(), 2);
    assert_eq!(page.revisions[0].revision_id, 222);
    assert_eq!(page.continue_token.as_deref(), Some("20251101000000|111"));
}

#[tokio::test]
async fn test_client_reports_missing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "batchcomplete": "",
            "query": {"pages": {"-1": {"ns": 0, "title": "Nope", "missing": ""}}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .revisions(&RevisionQuery::latest("Nope", 1))
        .await
        .unwrap();

    assert!(page.missing);
    assert!(page.revisions.is_empty());
}

#[tokio::test]
async fn test_client_sends_rvstart_for_age_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("rvstart", "2025-12-01T12:00:00Z"))
        .and(query_param("rvdir", "older"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": {"5": {"revisions": [
                {"revid": 9, "timestamp": "2025-11-30T08:00:00Z"}
            ]}}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .revisions(&RevisionQuery::at_or_before("Example", newest()))
        .await
        .unwrap();

    assert_eq!(page.revisions[0].revision_id, 9);
}

#[tokio::test]
async fn test_client_rendered_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .and(query_param("oldid", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "parse": {"title": "Example", "revid": 42, "text": {"*": "<p>Hello</p>"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .and(query_param("oldid", "43"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"code": "permissiondenied", "info": "revision deleted"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    assert_eq!(
        client.rendered_html(42).await.unwrap().as_deref(),
        Some("<p>Hello</p>")
    );
    assert_eq!(client.rendered_html(43).await.unwrap(), None);
}

#[tokio::test]
async fn test_client_transient_parse_error_is_not_inaccessible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"code": "maxlag", "info": "Waiting for a database server"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.rendered_html(44).await.unwrap_err();

    match &err {
        WikiError::Api { code, .. } => assert_eq!(code, "maxlag"),
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[test]
fn test_api_error_retryability() {
    let api = |code: &str| WikiError::Api {
        code: code.to_string(),
        info: String::new(),
    };

    assert!(api("ratelimited").is_retryable());
    assert!(api("internal_api_error_DBQueryError").is_retryable());
    assert!(!api("badvalue").is_retryable());
}

#[tokio::test]
async fn test_client_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.random_title().await.unwrap_err();

    match &err {
        WikiError::Server { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_random_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("list", "random"))
        .and(query_param("rnnamespace", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"random": [{"id": 1, "ns": 0, "title": "Henry Purcell"}]}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    assert_eq!(
        client.random_title().await.unwrap().as_deref(),
        Some("Henry Purcell")
    );
}

#[test]
fn test_client_trims_trailing_slash() {
    let client = MediaWikiClient::new("http://localhost:9000/w/api.php/", "ua").unwrap();
    assert_eq!(client.api_url(), "http://localhost:9000/w/api.php");
}
