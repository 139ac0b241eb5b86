use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schema::{ArbiterVerdict, ClassifierVerdict};

/// How strongly the three verdicts corroborate each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    /// Both classifiers and the arbiter agree.
    High,
    /// The classifiers disagree; the arbiter broke the tie.
    Moderate,
    /// The classifiers agree; the arbiter overruled them.
    Questionable,
    /// At least one verdict came without a justification.
    Unknown,
}

impl ConfidenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Moderate => "Moderate",
            ConfidenceLabel::Questionable => "Questionable",
            ConfidenceLabel::Unknown => "Unknown",
        }
    }

    /// Stored form in feedback records, where an unknown label is the empty string.
    pub fn record_value(&self) -> &'static str {
        match self {
            ConfidenceLabel::Unknown => "",
            known => known.as_str(),
        }
    }

    /// Parses the stored form; anything unrecognized is [`ConfidenceLabel::Unknown`].
    pub fn from_record_value(value: &str) -> Self {
        value.parse().unwrap_or(ConfidenceLabel::Unknown)
    }

    /// Label for a full set of verdicts.
    pub fn assess(
        heuristic: &ClassifierVerdict,
        fewshot: &ClassifierVerdict,
        arbiter: &ArbiterVerdict,
    ) -> Self {
        confidence(
            heuristic.noteworthy,
            fewshot.noteworthy,
            arbiter.noteworthy,
            heuristic.has_rationale(),
            fewshot.has_rationale(),
            arbiter.has_reasoning(),
        )
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ConfidenceLabel::High),
            "moderate" => Ok(ConfidenceLabel::Moderate),
            "questionable" => Ok(ConfidenceLabel::Questionable),
            "unknown" | "" => Ok(ConfidenceLabel::Unknown),
            _ => Err(format!("Unknown confidence label: {}", s)),
        }
    }
}

/// Combines the heuristic (`h`), few-shot (`f`) and arbiter (`j`) verdicts.
///
/// Missing justification on any of the three gives `Unknown`. Otherwise:
/// all equal is `High`, classifiers split is `Moderate`, and classifiers
/// agreeing against the arbiter is `Questionable`.
pub fn confidence(
    h: Option<bool>,
    f: Option<bool>,
    j: Option<bool>,
    has_rationale_1: bool,
    has_rationale_2: bool,
    has_reasoning: bool,
) -> ConfidenceLabel {
    if !(has_rationale_1 && has_rationale_2 && has_reasoning) {
        return ConfidenceLabel::Unknown;
    }
    if h == f && f == j {
        ConfidenceLabel::High
    } else if h != f {
        ConfidenceLabel::Moderate
    } else {
        ConfidenceLabel::Questionable
    }
}
