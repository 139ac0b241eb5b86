use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat, JsonSpec};
use serde_json::Value;
use tracing::debug;

use super::error::{ModelError, ModelResult};

/// A named JSON schema the model's answer must conform to.
#[derive(Debug)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub json: Value,
}

/// One model call: an instruction and the schema of the expected answer.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub instruction: String,
    pub schema: &'static ResponseSchema,
}

impl ModelRequest {
    pub fn new(instruction: impl Into<String>, schema: &'static ResponseSchema) -> Self {
        Self {
            instruction: instruction.into(),
            schema,
        }
    }
}

/// Raw access to a language model. Returns the model's text answer unparsed.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> ModelResult<String>;
}

/// [`ModelBackend`] over the `genai` multi-provider client.
///
/// Provider credentials are picked up by `genai` from the environment.
pub struct GenaiBackend {
    client: Client,
    model: String,
}

impl GenaiBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for GenaiBackend {
    async fn generate(&self, request: &ModelRequest) -> ModelResult<String> {
        let chat = ChatRequest::new(vec![ChatMessage::user(request.instruction.clone())]);
        let options = ChatOptions::default().with_response_format(ChatResponseFormat::JsonSpec(
            JsonSpec::new(request.schema.name, request.schema.json.clone()),
        ));

        debug!(model = %self.model, schema = request.schema.name, "calling model");
        let resp = self
            .client
            .exec_chat(&self.model, chat, Some(&options))
            .await?;

        match resp.first_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(ModelError::EmptyResponse),
        }
    }
}
