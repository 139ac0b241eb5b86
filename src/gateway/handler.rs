use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument, warn};

use crate::gateway::STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{CompareResponse, FeedbackRequest, RandomTitleResponse};
use crate::gateway::state::HandlerState;
use crate::session::CompareRequest;

#[instrument(skip(state))]
pub async fn random_title_handler(
    State(state): State<HandlerState>,
) -> Result<Response, GatewayError> {
    let title = state
        .session
        .resolver()
        .random_title()
        .await?
        .ok_or_else(|| GatewayError::NotFound("no random title available".to_string()))?;
    debug!(%title, "random title");

    Ok(Json(RandomTitleResponse { title }).into_response())
}

#[instrument(skip(state, request), fields(title = tracing::field::Empty))]
pub async fn compare_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: CompareRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    tracing::Span::current().record("title", tracing::field::display(&request.title));

    let report = match state.session.compare(&request).await {
        Ok(report) => report,
        Err(e) => {
            if e.is_retryable() {
                warn!(error = %e, "comparison failed on a backend");
            }
            return Err(e.into());
        }
    };
    let record = report.to_record();

    Ok(make_response(
        StatusCode::OK,
        report.confidence.as_str(),
        CompareResponse { report, record },
    ))
}

#[instrument(skip(state, request))]
pub async fn feedback_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: FeedbackRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    if request.record.page_title.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "record has no page title".to_string(),
        ));
    }

    let action = state
        .feedback
        .submit(request.record, request.feedback)
        .await?;
    info!(?action, "feedback recorded");

    Ok(make_response(StatusCode::OK, "recorded", action))
}

fn make_response<T: serde::Serialize>(status: StatusCode, label: &str, body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        STATUS_HEADER,
        HeaderValue::from_str(label).unwrap_or(HeaderValue::from_static("ok")),
    );
    (status, headers, Json(body)).into_response()
}
