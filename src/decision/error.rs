use thiserror::Error;

use crate::alignment::AlignmentError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum DecisionError {
    /// The model call failed after all retries.
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),

    /// Alignment text required by the selected mode is not available.
    #[error("alignment configuration error: {0}")]
    Configuration(#[source] AlignmentError),

    #[error("alignment storage error: {0}")]
    Alignment(#[source] AlignmentError),
}

impl From<AlignmentError> for DecisionError {
    fn from(err: AlignmentError) -> Self {
        if err.is_configuration() {
            DecisionError::Configuration(err)
        } else {
            DecisionError::Alignment(err)
        }
    }
}

pub type DecisionResult<T> = Result<T, DecisionError>;
