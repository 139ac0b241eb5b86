use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::backend::{ModelBackend, ModelRequest, ResponseSchema};
use super::error::{ModelError, ModelResult};

/// Scripted [`ModelBackend`].
///
/// Answers come from, in order: injected failures, the response queue, the
/// first rule whose needle occurs in the instruction, and finally a
/// placeholder object derived from the request schema.
#[derive(Default)]
pub struct MockModelBackend {
    queue: Mutex<VecDeque<ModelResult<String>>>,
    rules: Mutex<Vec<(String, String)>>,
    failures_remaining: AtomicU32,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockModelBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `response` to any instruction containing `needle`.
    pub fn respond_when(self, needle: &str, response: Value) -> Self {
        self.rules
            .lock()
            .push((needle.to_string(), response.to_string()));
        self
    }

    /// Queues a raw text answer (need not be valid JSON).
    pub fn push_text(&self, text: &str) {
        self.queue.lock().push_back(Ok(text.to_string()));
    }

    pub fn push_json(&self, response: Value) {
        self.queue.lock().push_back(Ok(response.to_string()));
    }

    pub fn push_error(&self, message: &str) {
        self.queue
            .lock()
            .push_back(Err(ModelError::Provider(message.to_string())));
    }

    /// Makes the next `count` calls fail with a provider error.
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Instructions received so far, oldest first.
    pub fn instructions(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.instruction.clone())
            .collect()
    }
}

#[async_trait]
impl ModelBackend for MockModelBackend {
    async fn generate(&self, request: &ModelRequest) -> ModelResult<String> {
        self.requests.lock().push(request.clone());

        let injected = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ModelError::Provider("mock outage".to_string()));
        }

        if let Some(next) = self.queue.lock().pop_front() {
            return next;
        }

        let rules = self.rules.lock();
        if let Some((_, response)) = rules
            .iter()
            .find(|(needle, _)| request.instruction.contains(needle.as_str()))
        {
            return Ok(response.clone());
        }

        Ok(placeholder(request.schema).to_string())
    }
}

/// `false` for booleans and `"mock <field>"` for strings.
fn placeholder(schema: &ResponseSchema) -> Value {
    let mut object = Map::new();
    if let Some(properties) = schema.json.get("properties").and_then(Value::as_object) {
        for (field, spec) in properties {
            let value = match spec.get("type").and_then(Value::as_str) {
                Some("boolean") => Value::Bool(false),
                Some("string") => Value::String(format!("mock {field}")),
                _ => Value::Null,
            };
            object.insert(field.clone(), value);
        }
    }
    Value::Object(object)
}
