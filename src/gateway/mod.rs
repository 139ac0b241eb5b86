//! HTTP gateway (Axum) in front of the comparison pipeline and feedback store.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{compare_handler, feedback_handler, random_title_handler};
pub use state::HandlerState;

/// Response header carrying a short machine-readable outcome.
pub const STATUS_HEADER: &str = "x-noteworthy-status";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/random-title", get(random_title_handler))
        .route("/v1/compare", post(compare_handler))
        .route("/v1/feedback", post(feedback_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok",
            provider: if state.mock_provider { "mock" } else { "live" },
        }),
    )
        .into_response()
}
