//! MediaWiki action API client.
//!
//! [`WikiSource`] is the seam the resolver and the lead extractor depend on;
//! [`MediaWikiClient`] is the reqwest-backed implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::{WikiError, WikiResult};
use super::model::{RevisionEntry, RevisionId, RevisionPage, RevisionQuery};

/// Parse error codes returned for deleted, suppressed or unknown revisions.
const UNRENDERABLE_REVISION_CODES: &[&str] = &["nosuchrevid", "permissiondenied", "missingtitle"];

/// Read access to revision history and revision-pinned renders.
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Lists revisions newest-first according to `query`.
    async fn revisions(&self, query: &RevisionQuery) -> WikiResult<RevisionPage>;

    /// Rendered HTML of exactly this revision, or `None` if it cannot be rendered.
    async fn rendered_html(&self, revision_id: RevisionId) -> WikiResult<Option<String>>;

    /// One random title from the article namespace.
    async fn random_title(&self) -> WikiResult<Option<String>>;
}

/// HTTP client for a MediaWiki `api.php` endpoint.
pub struct MediaWikiClient {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(rename = "continue", default)]
    continuation: Option<Continuation>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize, Default)]
struct QueryBody {
    #[serde(default)]
    pages: HashMap<String, PageBody>,
    #[serde(default)]
    random: Vec<RandomEntry>,
}

#[derive(Deserialize)]
struct PageBody {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    revisions: Vec<RawRevision>,
}

#[derive(Deserialize)]
struct RawRevision {
    revid: RevisionId,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct Continuation {
    #[serde(default)]
    rvcontinue: Option<String>,
}

#[derive(Deserialize)]
struct RandomEntry {
    title: String,
}

#[derive(Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParseBody>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ParseBody {
    #[serde(default)]
    text: Option<ParseText>,
}

#[derive(Deserialize)]
struct ParseText {
    #[serde(rename = "*")]
    html: Option<String>,
}

impl MediaWikiClient {
    /// Creates a client for `api_url` (e.g. `https://en.wikipedia.org/w/api.php`).
    ///
    /// MediaWiki rejects requests without a descriptive `User-Agent`.
    pub fn new(api_url: &str, user_agent: &str) -> WikiResult<Self> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T>(&self, params: &[(&str, String)]) -> WikiResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let resp = self.http.get(&self.api_url).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WikiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WikiSource for MediaWikiClient {
    async fn revisions(&self, query: &RevisionQuery) -> WikiResult<RevisionPage> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("prop", "revisions".to_string()),
            ("titles", query.title.clone()),
            ("rvlimit", query.limit.to_string()),
            ("rvdir", "older".to_string()),
            ("rvprop", "ids|timestamp".to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(start) = query.start {
            params.push((
                "rvstart",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(token) = &query.continue_token {
            params.push(("rvcontinue", token.clone()));
        }

        debug!(title = %query.title, limit = query.limit, "querying revision history");
        let resp: QueryResponse = self.get_json(&params).await?;
        if let Some(err) = resp.error {
            return Err(WikiError::Api {
                code: err.code,
                info: err.info,
            });
        }

        let continue_token = resp.continuation.and_then(|c| c.rvcontinue);
        let pages = resp.query.unwrap_or_default().pages;
        let Some((page_id, page)) = pages.into_iter().next() else {
            return Ok(RevisionPage::missing());
        };

        if page_id == "-1" || page.missing.is_some() || page.invalid.is_some() {
            info!(title = %query.title, "page not found");
            return Ok(RevisionPage::missing());
        }

        Ok(RevisionPage {
            missing: false,
            revisions: page
                .revisions
                .into_iter()
                .map(|r| RevisionEntry {
                    revision_id: r.revid,
                    timestamp: r.timestamp,
                })
                .collect(),
            continue_token,
        })
    }

    async fn rendered_html(&self, revision_id: RevisionId) -> WikiResult<Option<String>> {
        let params = [
            ("action", "parse".to_string()),
            ("oldid", revision_id.to_string()),
            ("prop", "text".to_string()),
            ("format", "json".to_string()),
        ];

        let resp: ParseResponse = self.get_json(&params).await?;
        if let Some(err) = resp.error {
            if UNRENDERABLE_REVISION_CODES.contains(&err.code.as_str()) {
                info!(revision_id, code = %err.code, "revision cannot be rendered");
                return Ok(None);
            }
            return Err(WikiError::Api {
                code: err.code,
                info: err.info,
            });
        }

        Ok(resp.parse.and_then(|p| p.text).and_then(|t| t.html))
    }

    async fn random_title(&self) -> WikiResult<Option<String>> {
        let params = [
            ("action", "query".to_string()),
            ("list", "random".to_string()),
            ("rnnamespace", "0".to_string()),
            ("rnlimit", "1".to_string()),
            ("format", "json".to_string()),
        ];

        let resp: QueryResponse = self.get_json(&params).await?;
        if let Some(err) = resp.error {
            return Err(WikiError::Api {
                code: err.code,
                info: err.info,
            });
        }

        Ok(resp
            .query
            .and_then(|q| q.random.into_iter().next())
            .map(|r| r.title))
    }
}
