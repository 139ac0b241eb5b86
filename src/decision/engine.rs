use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::alignment::{AlignmentError, AlignmentRepository};
use crate::model::{ModelRequest, ResilientInvoker};

use super::error::DecisionResult;
use super::mode::{AlignmentMode, PromptStyle};
use super::prompts::{
    ALIGNED_FEWSHOT_FRAGMENT, ARBITER_TEMPLATE, FEWSHOT_TEMPLATE, HEURISTIC_TEMPLATE, render,
};
use super::schema::{
    ARBITER_SCHEMA, ArbiterAnswer, ArbiterVerdict, CLASSIFIER_SCHEMA, ClassifierAnswer,
    ClassifierVerdict,
};

/// Runs the classifier and arbiter roles against one model.
#[derive(Clone)]
pub struct DecisionEngine {
    invoker: ResilientInvoker,
    alignments: Arc<dyn AlignmentRepository>,
}

impl DecisionEngine {
    pub fn new(invoker: ResilientInvoker, alignments: Arc<dyn AlignmentRepository>) -> Self {
        Self {
            invoker,
            alignments,
        }
    }

    pub fn alignments(&self) -> &Arc<dyn AlignmentRepository> {
        &self.alignments
    }

    /// Classifies the change from `old_text` to `new_text`.
    ///
    /// A missing or empty text yields [`ClassifierVerdict::unclassified`]
    /// without calling the model.
    #[instrument(skip(self, old_text, new_text))]
    pub async fn classify(
        &self,
        old_text: Option<&str>,
        new_text: Option<&str>,
        style: PromptStyle,
    ) -> DecisionResult<ClassifierVerdict> {
        let (Some(old_text), Some(new_text)) = (present(old_text), present(new_text)) else {
            debug!("nothing to classify");
            return Ok(ClassifierVerdict::unclassified());
        };

        let template = match style {
            PromptStyle::Heuristic => HEURISTIC_TEMPLATE,
            PromptStyle::FewShot => FEWSHOT_TEMPLATE,
        };
        let instruction = render(
            template,
            &[("old_revision", old_text), ("new_revision", new_text)],
        );

        let answer: ClassifierAnswer = self
            .invoker
            .invoke(&ModelRequest::new(instruction, &CLASSIFIER_SCHEMA))
            .await?;
        debug!(noteworthy = answer.noteworthy, "classifier verdict");
        Ok(answer.into())
    }

    /// Produces the final verdict from both texts and both classifier rationales.
    ///
    /// `round` pins an alignment round for [`AlignmentMode::AlignedHeuristic`];
    /// otherwise the latest round is used. Round 0 injects no fragment.
    #[instrument(skip(self, old_text, new_text, rationale_1, rationale_2))]
    pub async fn arbitrate(
        &self,
        old_text: Option<&str>,
        new_text: Option<&str>,
        rationale_1: Option<&str>,
        rationale_2: Option<&str>,
        mode: AlignmentMode,
        round: Option<u32>,
    ) -> DecisionResult<ArbiterVerdict> {
        let inputs = (
            present(old_text),
            present(new_text),
            present(rationale_1),
            present(rationale_2),
        );
        let (Some(old_text), Some(new_text), Some(rationale_1), Some(rationale_2)) = inputs else {
            debug!("nothing to arbitrate");
            return Ok(ArbiterVerdict::undecided());
        };

        let alignment = self.alignment_fragment(mode, round).await?;
        let instruction = render(
            ARBITER_TEMPLATE,
            &[
                ("old_revision", old_text),
                ("new_revision", new_text),
                ("rationale_1", rationale_1),
                ("rationale_2", rationale_2),
                ("alignment", &alignment),
            ],
        );

        let answer: ArbiterAnswer = self
            .invoker
            .invoke(&ModelRequest::new(instruction, &ARBITER_SCHEMA))
            .await?;
        info!(noteworthy = answer.noteworthy, "arbiter verdict");
        Ok(answer.into())
    }

    /// The fragment injected into the arbiter instructions for `mode`.
    pub async fn alignment_fragment(
        &self,
        mode: AlignmentMode,
        round: Option<u32>,
    ) -> DecisionResult<String> {
        match mode {
            AlignmentMode::Unaligned => Ok(String::new()),
            AlignmentMode::AlignedFewshot => Ok(ALIGNED_FEWSHOT_FRAGMENT.to_string()),
            AlignmentMode::AlignedHeuristic => {
                let round = match round {
                    Some(round) => round,
                    None => self
                        .alignments
                        .latest()
                        .await?
                        .ok_or(AlignmentError::NoRounds)?,
                };
                if round == 0 {
                    return Ok(String::new());
                }
                debug!(round, "using alignment round");
                let text = self.alignments.get(round).await?;
                Ok(format!("\n{}\n", text.trim()))
            }
        }
    }
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}
