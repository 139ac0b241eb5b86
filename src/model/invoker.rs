use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use super::backend::{ModelBackend, ModelRequest};
use super::error::{ModelError, ModelResult};
use super::retry::{RetryPolicy, retry_with_backoff};

/// Wraps a [`ModelBackend`] with retry, backoff and schema validation.
///
/// An answer that is not valid JSON for the expected type counts as a failed
/// call and is retried like any transport error.
#[derive(Clone)]
pub struct ResilientInvoker {
    backend: Arc<dyn ModelBackend>,
    policy: RetryPolicy,
}

impl ResilientInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes the model and decodes its answer into `T`.
    #[instrument(skip_all, fields(schema = request.schema.name))]
    pub async fn invoke<T: DeserializeOwned>(&self, request: &ModelRequest) -> ModelResult<T> {
        let backend = &self.backend;
        retry_with_backoff(&self.policy, move || async move {
            let text = backend.generate(request).await?;
            decode(request, &text)
        })
        .await
    }
}

fn decode<T: DeserializeOwned>(request: &ModelRequest, text: &str) -> ModelResult<T> {
    serde_json::from_str(strip_code_fence(text)).map_err(|source| ModelError::InvalidResponse {
        schema: request.schema.name,
        source,
    })
}

/// Some providers wrap JSON answers in a Markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
