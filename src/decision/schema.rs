//! Response schemas and verdict types for the two model roles.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::model::ResponseSchema;

/// `{noteworthy: bool, rationale: string}`.
pub static CLASSIFIER_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| ResponseSchema {
    name: "classifier_verdict",
    json: serde_json::json!({
        "type": "object",
        "properties": {
            "noteworthy": {"type": "boolean"},
            "rationale": {"type": "string"}
        },
        "required": ["noteworthy", "rationale"]
    }),
});

/// `{noteworthy: bool, reasoning: string}`.
pub static ARBITER_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| ResponseSchema {
    name: "arbiter_verdict",
    json: serde_json::json!({
        "type": "object",
        "properties": {
            "noteworthy": {"type": "boolean"},
            "reasoning": {"type": "string"}
        },
        "required": ["noteworthy", "reasoning"]
    }),
});

/// What the model must return in the classifier role.
#[derive(Debug, Deserialize)]
pub(crate) struct ClassifierAnswer {
    pub noteworthy: bool,
    pub rationale: String,
}

/// What the model must return in the arbiter role.
#[derive(Debug, Deserialize)]
pub(crate) struct ArbiterAnswer {
    pub noteworthy: bool,
    pub reasoning: String,
}

/// A classifier's decision. Both fields are `None` when there was nothing to classify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub noteworthy: Option<bool>,
    pub rationale: Option<String>,
}

impl ClassifierVerdict {
    pub fn unclassified() -> Self {
        Self::default()
    }

    pub fn has_rationale(&self) -> bool {
        self.rationale.as_deref().is_some_and(|r| !r.is_empty())
    }
}

impl From<ClassifierAnswer> for ClassifierVerdict {
    fn from(answer: ClassifierAnswer) -> Self {
        Self {
            noteworthy: Some(answer.noteworthy),
            rationale: Some(answer.rationale),
        }
    }
}

/// The arbiter's final decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterVerdict {
    pub noteworthy: Option<bool>,
    pub reasoning: Option<String>,
}

impl ArbiterVerdict {
    pub fn undecided() -> Self {
        Self::default()
    }

    pub fn has_reasoning(&self) -> bool {
        self.reasoning.as_deref().is_some_and(|r| !r.is_empty())
    }
}

impl From<ArbiterAnswer> for ArbiterVerdict {
    fn from(answer: ArbiterAnswer) -> Self {
        Self {
            noteworthy: Some(answer.noteworthy),
            reasoning: Some(answer.reasoning),
        }
    }
}

/// The arbiter's boolean as display text (`"True"` / `"False"`), only when it gave a reason.
pub fn noteworthy_label(verdict: &ArbiterVerdict) -> Option<String> {
    if !verdict.has_reasoning() {
        return None;
    }
    verdict
        .noteworthy
        .map(|n| if n { "True" } else { "False" }.to_string())
}
