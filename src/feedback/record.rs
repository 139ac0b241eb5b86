use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{AlignmentMode, ConfidenceLabel};
use crate::hashing::FieldHasher;
use crate::wiki::{RevisionDistance, Units};

const TIMESTAMP_PREFIX: &str = "**Timestamp:**";
const BEHIND_SUFFIX: &str = "revisions behind";

/// A reviewer's judgment of the arbiter's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackValue {
    Agree,
    Disagree,
}

impl FeedbackValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackValue::Agree => "agree",
            FeedbackValue::Disagree => "disagree",
        }
    }
}

impl fmt::Display for FeedbackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agree" => Ok(FeedbackValue::Agree),
            "disagree" => Ok(FeedbackValue::Disagree),
            _ => Err(format!("Unknown feedback value: {}", s)),
        }
    }
}

/// Dataset split a stored record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "test" => Ok(Split::Test),
            _ => Err(format!("Unknown split: {}", s)),
        }
    }
}

/// Snapshot of one comparison session, as shown to the reviewer.
///
/// Timestamps are display strings (`**Timestamp:** …, N revisions behind`);
/// optional texts are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub page_title: String,
    pub number: u32,
    pub units: Units,
    pub judge_mode: AlignmentMode,
    pub old_revision: String,
    pub new_revision: String,
    pub old_timestamp: String,
    pub new_timestamp: String,
    pub heuristic_rationale: String,
    pub fewshot_rationale: String,
    pub judge_reasoning: String,
    pub noteworthy_differences: String,
    pub confidence: String,
    pub heuristic_noteworthy: Option<bool>,
    pub fewshot_noteworthy: Option<bool>,
    pub judge_noteworthy: Option<bool>,
}

impl FeedbackRecord {
    /// Presentation-independent view used to detect repeated submissions.
    pub fn comparison_key(&self) -> ComparisonKey {
        ComparisonKey {
            page_title: self.page_title.trim().to_string(),
            number: self.number,
            units: self.units,
            judge_mode: self.judge_mode,
            old_revision: self.old_revision.clone(),
            new_revision: self.new_revision.clone(),
            old_timestamp: TimestampKey::parse(&self.old_timestamp),
            new_timestamp: TimestampKey::parse(&self.new_timestamp),
            heuristic_rationale: self.heuristic_rationale.clone(),
            fewshot_rationale: self.fewshot_rationale.clone(),
            judge_reasoning: self.judge_reasoning.clone(),
            noteworthy_differences: self.noteworthy_differences.clone(),
            confidence: ConfidenceLabel::from_record_value(&self.confidence),
            heuristic_noteworthy: self.heuristic_noteworthy,
            fewshot_noteworthy: self.fewshot_noteworthy,
            judge_noteworthy: self.judge_noteworthy,
        }
    }
}

/// What is written for each submission: the snapshot plus the feedback value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(flatten)]
    pub record: FeedbackRecord,
    pub feedback: FeedbackValue,
}

/// A persisted [`FeedbackEntry`] and where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeedback {
    /// Storage key, `{split}-{written_at}`.
    pub id: String,
    pub split: Split,
    pub written_at: DateTime<Utc>,
    pub entry: FeedbackEntry,
}

/// Renders a revision timestamp the way records store it.
pub fn format_timestamp(
    timestamp: DateTime<Utc>,
    revisions_behind: Option<RevisionDistance>,
) -> String {
    let ts = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    match revisions_behind {
        Some(behind) => format!("{TIMESTAMP_PREFIX} {ts}, {behind} {BEHIND_SUFFIX}"),
        None => format!("{TIMESTAMP_PREFIX} {ts}"),
    }
}

/// Structural form of a timestamp display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampKey {
    Empty,
    Parsed {
        instant: DateTime<Utc>,
        revisions_behind: Option<RevisionDistance>,
    },
    /// Unrecognized text, compared after trimming.
    Raw(String),
}

impl TimestampKey {
    pub fn parse(display: &str) -> Self {
        let body = display.trim();
        let body = body.strip_prefix(TIMESTAMP_PREFIX).unwrap_or(body).trim();
        if body.is_empty() {
            return TimestampKey::Empty;
        }

        let (ts, rest) = match body.split_once(',') {
            Some((ts, rest)) => (ts.trim(), Some(rest.trim())),
            None => (body, None),
        };

        let Some(instant) = parse_instant(ts) else {
            return TimestampKey::Raw(body.to_string());
        };
        let revisions_behind = match rest {
            None => None,
            Some(rest) => {
                let count = rest.strip_suffix(BEHIND_SUFFIX).unwrap_or(rest).trim();
                match count.parse::<RevisionDistance>() {
                    Ok(distance) => Some(distance),
                    Err(_) => return TimestampKey::Raw(body.to_string()),
                }
            }
        };

        TimestampKey::Parsed {
            instant,
            revisions_behind,
        }
    }

    fn hash_into(&self, hasher: &mut FieldHasher) {
        match self {
            TimestampKey::Empty => {
                hasher.str("empty");
            }
            TimestampKey::Parsed {
                instant,
                revisions_behind,
            } => {
                hasher.str("parsed").str(&instant.to_rfc3339());
                match revisions_behind {
                    Some(behind) => hasher.str(&behind.to_string()),
                    None => hasher.str(""),
                };
            }
            TimestampKey::Raw(raw) => {
                hasher.str("raw").str(raw);
            }
        }
    }
}

/// RFC 3339 with any offset, or a naive ISO timestamp taken as UTC.
fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Every [`FeedbackRecord`] field, with display formatting normalized away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonKey {
    pub page_title: String,
    pub number: u32,
    pub units: Units,
    pub judge_mode: AlignmentMode,
    pub old_revision: String,
    pub new_revision: String,
    pub old_timestamp: TimestampKey,
    pub new_timestamp: TimestampKey,
    pub heuristic_rationale: String,
    pub fewshot_rationale: String,
    pub judge_reasoning: String,
    pub noteworthy_differences: String,
    pub confidence: ConfidenceLabel,
    pub heuristic_noteworthy: Option<bool>,
    pub fewshot_noteworthy: Option<bool>,
    pub judge_noteworthy: Option<bool>,
}

impl ComparisonKey {
    /// Short BLAKE3 fingerprint, stable across processes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = FieldHasher::new("comparison");
        hasher
            .str(&self.page_title)
            .str(&self.number.to_string())
            .str(self.units.as_str())
            .str(self.judge_mode.as_str())
            .str(&self.old_revision)
            .str(&self.new_revision);
        self.old_timestamp.hash_into(&mut hasher);
        self.new_timestamp.hash_into(&mut hasher);
        hasher
            .str(&self.heuristic_rationale)
            .str(&self.fewshot_rationale)
            .str(&self.judge_reasoning)
            .str(&self.noteworthy_differences)
            .str(self.confidence.as_str())
            .opt_bool(self.heuristic_noteworthy)
            .opt_bool(self.fewshot_noteworthy)
            .opt_bool(self.judge_noteworthy);
        hasher.finish_hex()
    }
}
