use thiserror::Error;

/// Errors from a single model invocation.
///
/// Every variant is treated as transient by
/// [`ResilientInvoker`](super::ResilientInvoker): the backend is rate limited
/// and non-deterministic, so even a malformed answer may succeed on retry.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model provider request failed: {0}")]
    Provider(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("response does not match the '{schema}' schema: {source}")]
    InvalidResponse {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<genai::Error> for ModelError {
    fn from(err: genai::Error) -> Self {
        ModelError::Provider(err.to_string())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
