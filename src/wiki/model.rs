use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MediaWiki revision identifier.
pub type RevisionId = u64;

/// A concrete revision picked out of an article's history.
///
/// `revision_id == None` means the page (or the requested revision) was not
/// found. Values are created per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRef {
    pub revision_id: Option<RevisionId>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Ordinal within the fetched history page (0 = current). Unknown for age lookups.
    pub revision_index: Option<u32>,
    /// Set when a count lookup ran past the oldest revision and was clamped to it.
    #[serde(default)]
    pub clamped: bool,
}

impl RevisionRef {
    pub fn not_found() -> Self {
        Self {
            revision_id: None,
            timestamp: None,
            revision_index: None,
            clamped: false,
        }
    }

    pub fn is_found(&self) -> bool {
        self.revision_id.is_some()
    }
}

/// One entry of a revision history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionEntry {
    pub revision_id: RevisionId,
    pub timestamp: DateTime<Utc>,
}

/// A page of revision history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionPage {
    /// The title does not exist.
    pub missing: bool,
    pub revisions: Vec<RevisionEntry>,
    /// Opaque token for the next (older) page, if any.
    pub continue_token: Option<String>,
}

impl RevisionPage {
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Default::default()
        }
    }
}

/// Parameters of a revision history request (always ordered newest-first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionQuery {
    pub title: String,
    pub limit: u32,
    /// Only list revisions made at or before this instant.
    pub start: Option<DateTime<Utc>>,
    pub continue_token: Option<String>,
}

impl RevisionQuery {
    pub fn latest(title: &str, limit: u32) -> Self {
        Self {
            title: title.to_string(),
            limit,
            start: None,
            continue_token: None,
        }
    }

    pub fn at_or_before(title: &str, start: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            limit: 1,
            start: Some(start),
            continue_token: None,
        }
    }

    pub fn continued(mut self, token: Option<String>) -> Self {
        self.continue_token = token;
        self
    }
}

/// How far a resolved revision sits behind the current one.
///
/// `AtLeast` is reported when the bounded history scan ran out before the
/// revision was found. Legacy consumers see it as a negative number
/// (see [`RevisionDistance::legacy_value`]) and display it as `>N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "revisions", rename_all = "snake_case")]
pub enum RevisionDistance {
    Exact(u64),
    AtLeast(u64),
    PageMissing,
}

impl RevisionDistance {
    /// Signed form: `n` for exact distances, `-n` for "more than n behind".
    pub fn legacy_value(&self) -> Option<i64> {
        match self {
            RevisionDistance::Exact(n) => Some(*n as i64),
            RevisionDistance::AtLeast(n) => Some(-(*n as i64)),
            RevisionDistance::PageMissing => None,
        }
    }

    pub fn from_legacy(value: i64) -> Self {
        if value < 0 {
            RevisionDistance::AtLeast(value.unsigned_abs())
        } else {
            RevisionDistance::Exact(value as u64)
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, RevisionDistance::Exact(_))
    }
}

impl fmt::Display for RevisionDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionDistance::Exact(n) => write!(f, "{n}"),
            RevisionDistance::AtLeast(n) => write!(f, ">{n}"),
            RevisionDistance::PageMissing => write!(f, "unknown"),
        }
    }
}

impl FromStr for RevisionDistance {
    type Err = String;

    /// Accepts the display form (`"50"`, `">500"`, `"unknown"`) and the signed legacy form (`"-500"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(RevisionDistance::PageMissing);
        }
        if let Some(rest) = s.strip_prefix('>') {
            return rest
                .trim()
                .parse::<u64>()
                .map(RevisionDistance::AtLeast)
                .map_err(|e| format!("invalid revision distance '{s}': {e}"));
        }
        s.parse::<i64>()
            .map(RevisionDistance::from_legacy)
            .map_err(|e| format!("invalid revision distance '{s}': {e}"))
    }
}

/// Unit of the "how far back" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Revisions,
    Days,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Revisions => "revisions",
            Units::Days => "days",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revisions" | "revision" => Ok(Units::Revisions),
            "days" | "day" => Ok(Units::Days),
            _ => Err(format!("Unknown units: {}", s)),
        }
    }
}

/// What a count lookup does when the article has fewer revisions than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Report the revision as not found.
    #[default]
    Strict,
    /// Return the oldest available revision, flagged as clamped.
    Clamp,
}
