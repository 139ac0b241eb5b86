use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::decision::DecisionError;
use crate::feedback::FeedbackError;
use crate::session::SessionError;
use crate::wiki::WikiError;

use super::STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<WikiError> for GatewayError {
    fn from(err: WikiError) -> Self {
        match err {
            WikiError::InvalidRequest(msg) => GatewayError::InvalidRequest(msg),
            other => GatewayError::Upstream(other.to_string()),
        }
    }
}

impl From<SessionError> for GatewayError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidRequest(msg) => GatewayError::InvalidRequest(msg),
            SessionError::PageNotFound(_) | SessionError::RevisionNotFound { .. } => {
                GatewayError::NotFound(err.to_string())
            }
            SessionError::Wiki(e) => e.into(),
            SessionError::Decision(DecisionError::Model(e)) => {
                GatewayError::Upstream(e.to_string())
            }
            SessionError::Decision(DecisionError::Configuration(e)) => {
                GatewayError::Configuration(e.to_string())
            }
            SessionError::Decision(DecisionError::Alignment(e)) => {
                GatewayError::Storage(e.to_string())
            }
        }
    }
}

impl From<FeedbackError> for GatewayError {
    fn from(err: FeedbackError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, status_label) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            GatewayError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            GatewayError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(status_label));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
