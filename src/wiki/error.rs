use thiserror::Error;

/// Errors returned by revision-history and rendering lookups.
///
/// A missing page or revision is *not* an error: the resolver reports it as a
/// [`RevisionRef`](super::RevisionRef) without an identifier.
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MediaWiki API error '{code}': {info}")]
    Api { code: String, info: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl WikiError {
    /// Returns `true` for failures a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            WikiError::Http(e) => !e.is_builder() && !e.is_redirect(),
            WikiError::Server { status, .. } => *status == 429 || *status >= 500,
            WikiError::Api { code, .. } => {
                matches!(code.as_str(), "maxlag" | "ratelimited" | "readonly")
                    || code.starts_with("internal_api_error")
            }
            WikiError::Json(_) | WikiError::InvalidRequest(_) => false,
        }
    }
}

pub type WikiResult<T> = Result<T, WikiError>;
