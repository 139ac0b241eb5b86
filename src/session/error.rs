use thiserror::Error;

use crate::decision::DecisionError;
use crate::wiki::{Units, WikiError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("could not find Wikipedia page '{0}'")]
    PageNotFound(String),

    #[error("could not find revision {number} {units} behind for '{title}'")]
    RevisionNotFound {
        title: String,
        number: u32,
        units: Units,
    },

    #[error("wiki lookup failed: {0}")]
    Wiki(#[from] WikiError),

    #[error(transparent)]
    Decision(#[from] DecisionError),
}

impl SessionError {
    /// Missing pages and revisions are caused by the request, not by a backend.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SessionError::PageNotFound(_) | SessionError::RevisionNotFound { .. }
        )
    }

    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Wiki(e) => e.is_retryable(),
            SessionError::Decision(DecisionError::Model(_)) => true,
            _ => false,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
