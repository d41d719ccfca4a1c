use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a project: created empty, parsed from an upload, then drafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Intake,
    Parsed,
    Drafting,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Intake => "Intake",
            ProjectStatus::Parsed => "Parsed",
            ProjectStatus::Drafting => "Drafting",
        }
    }

    /// Status after an upload that produced `requirement_count` requirements.
    pub fn after_upload(requirement_count: usize) -> Self {
        if requirement_count > 0 {
            ProjectStatus::Parsed
        } else {
            ProjectStatus::Intake
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of a single requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequirementStatus {
    Todo,
    Drafted,
    Reviewed,
    Submitted,
}

impl RequirementStatus {
    pub const ALL: [RequirementStatus; 4] = [
        RequirementStatus::Todo,
        RequirementStatus::Drafted,
        RequirementStatus::Reviewed,
        RequirementStatus::Submitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Todo => "TODO",
            RequirementStatus::Drafted => "DRAFTED",
            RequirementStatus::Reviewed => "REVIEWED",
            RequirementStatus::Submitted => "SUBMITTED",
        }
    }

    /// Reviewed or submitted requirements count towards project progress.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            RequirementStatus::Reviewed | RequirementStatus::Submitted
        )
    }

    /// Stored labels of every status that counts as done.
    pub fn done_labels() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|s| s.is_done())
            .map(|s| s.as_str())
            .collect()
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequirementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(RequirementStatus::Todo),
            "DRAFTED" => Ok(RequirementStatus::Drafted),
            "REVIEWED" => Ok(RequirementStatus::Reviewed),
            "SUBMITTED" => Ok(RequirementStatus::Submitted),
            other => Err(format!(
                "status must be one of TODO, DRAFTED, REVIEWED, SUBMITTED (got '{other}')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_upload() {
        assert_eq!(ProjectStatus::after_upload(0), ProjectStatus::Intake);
        assert_eq!(ProjectStatus::after_upload(3), ProjectStatus::Parsed);
    }

    #[test]
    fn test_requirement_status_parse() {
        assert_eq!(
            "REVIEWED".parse::<RequirementStatus>(),
            Ok(RequirementStatus::Reviewed)
        );
        assert!("reviewed".parse::<RequirementStatus>().is_err());
        assert!("DONE".parse::<RequirementStatus>().is_err());
    }

    #[test]
    fn test_requirement_status_serde_matches_as_str() {
        for status in RequirementStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_done_states() {
        assert!(RequirementStatus::Reviewed.is_done());
        assert!(RequirementStatus::Submitted.is_done());
        assert!(!RequirementStatus::Drafted.is_done());
        assert!(!RequirementStatus::Todo.is_done());
        assert_eq!(
            RequirementStatus::done_labels(),
            vec!["REVIEWED", "SUBMITTED"]
        );
    }
}
