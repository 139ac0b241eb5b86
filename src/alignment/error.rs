use std::path::PathBuf;

use thiserror::Error;

use crate::feedback::FeedbackError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("no alignment rounds are available")]
    NoRounds,

    #[error("alignment round {0} not found")]
    RoundNotFound(u32),

    #[error("alignment round {0} already exists")]
    RoundExists(u32),

    #[error("alignment storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no feedback records to learn from")]
    NoFeedback,

    #[error("alignment update failed: {0}")]
    Model(#[from] ModelError),

    #[error("feedback store error: {0}")]
    Feedback(#[from] FeedbackError),
}

impl AlignmentError {
    /// `true` when a required round is absent, which is a deployment problem
    /// rather than a runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AlignmentError::NoRounds | AlignmentError::RoundNotFound(_))
    }
}

pub type AlignmentResult<T> = Result<T, AlignmentError>;
