use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which classifier template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptStyle {
    Heuristic,
    FewShot,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Heuristic => "heuristic",
            PromptStyle::FewShot => "few-shot",
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" => Ok(PromptStyle::Heuristic),
            "few-shot" | "fewshot" => Ok(PromptStyle::FewShot),
            _ => Err(format!("Unknown prompt style: {}", s)),
        }
    }
}

/// Which alignment fragment the arbiter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentMode {
    /// No fragment.
    Unaligned,
    /// The fixed hand-written fragment.
    #[serde(alias = "aligned")]
    AlignedFewshot,
    /// The latest (or a pinned) numbered alignment round.
    #[default]
    AlignedHeuristic,
}

impl AlignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentMode::Unaligned => "unaligned",
            AlignmentMode::AlignedFewshot => "aligned-fewshot",
            AlignmentMode::AlignedHeuristic => "aligned-heuristic",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unaligned" => Ok(AlignmentMode::Unaligned),
            "aligned" | "aligned-fewshot" => Ok(AlignmentMode::AlignedFewshot),
            "aligned-heuristic" => Ok(AlignmentMode::AlignedHeuristic),
            _ => Err(format!("Unknown alignment mode: {}", s)),
        }
    }
}
