use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::decision::prompts::{ALIGNMENT_UPDATE_TEMPLATE, render};
use crate::feedback::{FeedbackEntry, FeedbackStore, FeedbackValue, Split};
use crate::model::{ModelRequest, ResilientInvoker, ResponseSchema};

use super::error::{AlignmentError, AlignmentResult};
use super::repository::AlignmentRepository;

static ALIGNMENT_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| ResponseSchema {
    name: "alignment_update",
    json: serde_json::json!({
        "type": "object",
        "properties": {
            "alignment": {"type": "string"}
        },
        "required": ["alignment"]
    }),
});

#[derive(Deserialize)]
struct AlignmentAnswer {
    alignment: String,
}

/// The reviewer's label for an entry: the arbiter's verdict if they agreed,
/// its negation if they disagreed. A missing verdict counts as `false`.
pub fn ground_truth(entry: &FeedbackEntry) -> bool {
    let judged = entry.record.judge_noteworthy.unwrap_or(false);
    match entry.feedback {
        FeedbackValue::Agree => judged,
        FeedbackValue::Disagree => !judged,
    }
}

/// One reviewed case as shown to the model when regenerating guidance.
pub fn training_example(entry: &FeedbackEntry) -> String {
    let label = if ground_truth(entry) {
        "noteworthy differences"
    } else {
        "not noteworthy differences"
    };
    format!(
        "Model 1: {}\nModel 2: {}\nAI Judge: {}\nHuman feedback: {} ({}).",
        entry.record.heuristic_rationale,
        entry.record.fewshot_rationale,
        entry.record.judge_reasoning,
        entry.feedback,
        label,
    )
}

/// Produces new alignment rounds from accumulated feedback.
pub struct AlignmentUpdater {
    invoker: ResilientInvoker,
    repository: Arc<dyn AlignmentRepository>,
}

impl AlignmentUpdater {
    pub fn new(invoker: ResilientInvoker, repository: Arc<dyn AlignmentRepository>) -> Self {
        Self {
            invoker,
            repository,
        }
    }

    /// Writes round `round` (default: latest + 1) from round `round - 1` and `entries`.
    ///
    /// Returns the round written. The previous round must exist and the new
    /// one must not.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn regenerate(
        &self,
        entries: &[FeedbackEntry],
        round: Option<u32>,
    ) -> AlignmentResult<u32> {
        if entries.is_empty() {
            return Err(AlignmentError::NoFeedback);
        }

        let round = match round {
            Some(round) => round,
            None => self.repository.latest().await?.ok_or(AlignmentError::NoRounds)? + 1,
        };
        let previous = round.checked_sub(1).ok_or(AlignmentError::RoundNotFound(0))?;
        let previous_text = self.repository.get(previous).await?;

        let examples = entries
            .iter()
            .map(training_example)
            .collect::<Vec<_>>()
            .join("\n\n");
        let instruction = render(
            ALIGNMENT_UPDATE_TEMPLATE,
            &[
                ("alignment_text", previous_text.as_str()),
                ("examples_text", examples.as_str()),
            ],
        );

        let answer: AlignmentAnswer = self
            .invoker
            .invoke(&ModelRequest::new(instruction, &ALIGNMENT_SCHEMA))
            .await?;
        self.repository.put(round, answer.alignment.trim()).await?;

        info!(round, previous, "alignment regenerated");
        Ok(round)
    }

    /// [`Self::regenerate`] over every training-split entry in `store`.
    pub async fn regenerate_from(
        &self,
        store: &dyn FeedbackStore,
        round: Option<u32>,
    ) -> AlignmentResult<u32> {
        let entries: Vec<FeedbackEntry> = store
            .all()
            .await?
            .into_iter()
            .filter(|stored| stored.split == Split::Train)
            .map(|stored| stored.entry)
            .collect();
        self.regenerate(&entries, round).await
    }
}
