use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed feedback record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("feedback record '{0}' not found")]
    NotFound(String),
}

pub type FeedbackResult<T> = Result<T, FeedbackError>;
