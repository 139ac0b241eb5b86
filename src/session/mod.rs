//! One end-to-end comparison: resolve, extract, classify, arbitrate.
//!
//! Stages run in order because each needs the previous one's output. The only
//! concurrency inside a session is between the two classifier styles.

pub mod error;


use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::constants::{DEFAULT_COMPARE_NUMBER, MAX_REVISIONS_BACK};
use crate::decision::{
    AlignmentMode, ArbiterVerdict, ClassifierVerdict, ConfidenceLabel, DecisionEngine,
    PromptStyle, noteworthy_label,
};
use crate::extract::LeadExtractor;
use crate::feedback::{FeedbackRecord, format_timestamp};
use crate::wiki::{RevisionDistance, RevisionRef, RevisionResolver, Units};

pub use error::{SessionError, SessionResult};

fn default_number() -> u32 {
    DEFAULT_COMPARE_NUMBER
}

fn default_units() -> Units {
    Units::Revisions
}

/// What to compare: the current lead of `title` against the one `number` `units` ago.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub title: String,
    #[serde(default = "default_number")]
    pub number: u32,
    #[serde(default = "default_units")]
    pub units: Units,
    #[serde(default)]
    pub mode: AlignmentMode,
    /// Alignment round to pin; the latest round when absent.
    #[serde(default)]
    pub round: Option<u32>,
}

impl CompareRequest {
    pub fn new(title: impl Into<String>, number: u32, units: Units) -> Self {
        Self {
            title: title.into(),
            number,
            units,
            mode: AlignmentMode::default(),
            round: None,
        }
    }

    pub fn with_mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }
}

/// Everything one session produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Correlates log lines and responses of one comparison.
    pub session_id: Uuid,
    pub title: String,
    pub number: u32,
    pub units: Units,
    pub mode: AlignmentMode,
    pub current: RevisionRef,
    pub previous: RevisionRef,
    pub revisions_behind: RevisionDistance,
    /// `None` when the revision exists but could not be rendered.
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub heuristic: ClassifierVerdict,
    pub fewshot: ClassifierVerdict,
    pub judge: ArbiterVerdict,
    pub confidence: ConfidenceLabel,
}

impl ComparisonReport {
    /// The snapshot a reviewer's feedback is stored against.
    pub fn to_record(&self) -> FeedbackRecord {
        FeedbackRecord {
            page_title: self.title.clone(),
            number: self.number,
            units: self.units,
            judge_mode: self.mode,
            old_revision: self.old_text.clone().unwrap_or_default(),
            new_revision: self.new_text.clone().unwrap_or_default(),
            old_timestamp: self
                .previous
                .timestamp
                .map(|ts| format_timestamp(ts, Some(self.revisions_behind)))
                .unwrap_or_default(),
            new_timestamp: self
                .current
                .timestamp
                .map(|ts| format_timestamp(ts, None))
                .unwrap_or_default(),
            heuristic_rationale: self.heuristic.rationale.clone().unwrap_or_default(),
            fewshot_rationale: self.fewshot.rationale.clone().unwrap_or_default(),
            judge_reasoning: self.judge.reasoning.clone().unwrap_or_default(),
            noteworthy_differences: noteworthy_label(&self.judge).unwrap_or_default(),
            confidence: self.confidence.record_value().to_string(),
            heuristic_noteworthy: self.heuristic.noteworthy,
            fewshot_noteworthy: self.fewshot.noteworthy,
            judge_noteworthy: self.judge.noteworthy,
        }
    }
}

/// Runs comparisons against shared, explicitly injected collaborators.
#[derive(Clone)]
pub struct ComparisonSession {
    resolver: RevisionResolver,
    extractor: LeadExtractor,
    engine: DecisionEngine,
}

impl ComparisonSession {
    pub fn new(resolver: RevisionResolver, extractor: LeadExtractor, engine: DecisionEngine) -> Self {
        Self {
            resolver,
            extractor,
            engine,
        }
    }

    pub fn resolver(&self) -> &RevisionResolver {
        &self.resolver
    }

    pub fn extractor(&self) -> &LeadExtractor {
        &self.extractor
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    #[instrument(
        skip(self, request),
        fields(
            session_id = tracing::field::Empty,
            title = %request.title,
            number = request.number,
            units = %request.units,
            mode = %request.mode
        )
    )]
    pub async fn compare(&self, request: &CompareRequest) -> SessionResult<ComparisonReport> {
        let session_id = Uuid::new_v4();
        tracing::Span::current().record("session_id", tracing::field::display(session_id));

        let title = request.title.trim();
        if title.is_empty() {
            return Err(SessionError::InvalidRequest(
                "page title must not be empty".to_string(),
            ));
        }
        if request.units == Units::Revisions && request.number > MAX_REVISIONS_BACK {
            return Err(SessionError::InvalidRequest(format!(
                "can look back at most {MAX_REVISIONS_BACK} revisions, got {}",
                request.number
            )));
        }

        let current = self.resolver.resolve_current(title).await?;
        let Some(current_id) = current.revision_id else {
            return Err(SessionError::PageNotFound(title.to_string()));
        };

        let previous = match request.units {
            Units::Revisions => self.resolver.resolve_by_count(title, request.number).await?,
            Units::Days => self.resolver.resolve_by_age(title, request.number).await?,
        };
        let Some(previous_id) = previous.revision_id else {
            return Err(SessionError::RevisionNotFound {
                title: title.to_string(),
                number: request.number,
                units: request.units,
            });
        };
        let revisions_behind = self
            .resolver
            .revisions_behind(title, request.units, &previous)
            .await?;

        let new_text = self.extractor.extract_lead(current_id).await?;
        let old_text = self.extractor.extract_lead(previous_id).await?;

        let (heuristic, fewshot) = tokio::join!(
            self.engine
                .classify(old_text.as_deref(), new_text.as_deref(), PromptStyle::Heuristic),
            self.engine
                .classify(old_text.as_deref(), new_text.as_deref(), PromptStyle::FewShot),
        );
        let (heuristic, fewshot) = (heuristic?, fewshot?);

        let judge = self
            .engine
            .arbitrate(
                old_text.as_deref(),
                new_text.as_deref(),
                heuristic.rationale.as_deref(),
                fewshot.rationale.as_deref(),
                request.mode,
                request.round,
            )
            .await?;
        let confidence = ConfidenceLabel::assess(&heuristic, &fewshot, &judge);

        info!(
            current = current_id,
            previous = previous_id,
            %revisions_behind,
            noteworthy = ?judge.noteworthy,
            %confidence,
            "comparison complete"
        );

        Ok(ComparisonReport {
            session_id,
            title: title.to_string(),
            number: request.number,
            units: request.units,
            mode: request.mode,
            current,
            previous,
            revisions_behind,
            old_text,
            new_text,
            heuristic,
            fewshot,
            judge,
            confidence,
        })
    }
}
