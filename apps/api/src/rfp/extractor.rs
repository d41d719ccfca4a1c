//! Requirement Extractor: line-oriented heuristics that turn raw RFP text into
//! prioritized requirement records.
//!
//! Algorithm:
//! 1. Split on line breaks, trim, drop lines of 10 characters or fewer
//! 2. Keep lines containing an obligation/deliverable keyword (word match)
//! 3. Keep the first `MAX_REQUIREMENTS` survivors in source order
//! 4. Label, date-match and prioritize each kept line
//!
//! Recall over precision: lines without a keyword are dropped silently, and an
//! empty result simply means nothing was detected.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lines must be longer than this (in characters) to be considered.
const MIN_LINE_CHARS: usize = 10;
/// Upper bound on requirements produced from one document.
pub const MAX_REQUIREMENTS: usize = 30;

static REQUIREMENT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(shall|must|required|proposal|deliver|compliance|deadline|due)(?-u:\b)",
    )
    .expect("static requirement keyword pattern")
});

static DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(20[0-9]{2}-[0-9]{2}-[0-9]{2}|(?-u:\b)[0-9]{1,2}/[0-9]{1,2}/20[0-9]{2}(?-u:\b)|due\s+by\s+[^.,;\n]+)",
    )
    .expect("static deadline pattern")
});

static HIGH_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)must|shall|required|compliance").expect("static high-priority pattern")
});

static MEDIUM_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)proposal|deliver|due").expect("static medium-priority pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// High on obligation words, Medium on deliverable words, otherwise Low.
    pub fn classify(line: &str) -> Self {
        if HIGH_PRIORITY.is_match(line) {
            Priority::High
        } else if MEDIUM_PRIORITY.is_match(line) {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// A single requirement detected in an RFP document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRequirement {
    /// Ordinal label, e.g. "Requirement 3". Not derived from content.
    pub title: String,
    /// The source line, verbatim (trimmed).
    pub details: String,
    pub deadline: Option<String>,
    pub priority: Priority,
}

/// First date-like substring in `line`: ISO date, D/M/YYYY, or "due by ...".
pub fn find_deadline(line: &str) -> Option<&str> {
    DEADLINE.find(line).map(|m| m.as_str())
}

fn is_candidate(line: &str) -> bool {
    line.chars().count() > MIN_LINE_CHARS && REQUIREMENT_KEYWORDS.is_match(line)
}

/// Extracts up to `MAX_REQUIREMENTS` requirements from raw document text.
pub fn extract_requirements(text: &str) -> Vec<ParsedRequirement> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| is_candidate(line))
        .take(MAX_REQUIREMENTS)
        .enumerate()
        .map(|(idx, line)| ParsedRequirement {
            title: format!("Requirement {}", idx + 1),
            details: line.to_string(),
            deadline: find_deadline(line).map(str::to_string),
            priority: Priority::classify(line),
        })
        .collect()
}
