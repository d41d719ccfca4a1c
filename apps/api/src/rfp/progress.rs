use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::project::ProjectProgressRow;

/// Share of requirements that are reviewed or submitted, as a whole percentage.
/// A project without requirements reports 0.
pub fn progress_percent(done: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }
    let done = done.clamp(0, total);
    ((done as f64 / total as f64) * 100.0).round() as u8
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectProgress {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub requirement_count: i64,
    pub done_count: i64,
    pub progress: u8,
}

impl From<ProjectProgressRow> for ProjectProgress {
    fn from(row: ProjectProgressRow) -> Self {
        Self {
            progress: progress_percent(row.done_count, row.requirement_count),
            id: row.id,
            name: row.name,
            status: row.status,
            updated_at: row.updated_at,
            requirement_count: row.requirement_count,
            done_count: row.done_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub total_requirements: i64,
    pub drafted_requirements: i64,
    pub total_answers: i64,
    pub projects: Vec<ProjectProgress>,
}

impl DashboardSummary {
    pub fn build(
        rows: Vec<ProjectProgressRow>,
        drafted_requirements: i64,
        total_answers: i64,
    ) -> Self {
        let projects: Vec<ProjectProgress> = rows.into_iter().map(ProjectProgress::from).collect();
        Self {
            total_projects: projects.len(),
            total_requirements: projects.iter().map(|p| p.requirement_count).sum(),
            drafted_requirements,
            total_answers,
            projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, total: i64, done: i64) -> ProjectProgressRow {
        ProjectProgressRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: "Parsed".to_string(),
            updated_at: Utc::now(),
            requirement_count: total,
            done_count: done,
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(0, 5), 0);
        assert_eq!(progress_percent(5, 5), 100);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
    }

    #[test]
    fn test_progress_percent_clamps_inconsistent_counts() {
        assert_eq!(progress_percent(7, 5), 100);
        assert_eq!(progress_percent(-1, 5), 0);
    }

    #[test]
    fn test_dashboard_totals() {
        let summary = DashboardSummary::build(
            vec![row("Alpha", 4, 1), row("Beta", 0, 0), row("Gamma", 2, 2)],
            3,
            7,
        );
        assert_eq!(summary.total_projects, 3);
        assert_eq!(summary.total_requirements, 6);
        assert_eq!(summary.drafted_requirements, 3);
        assert_eq!(summary.total_answers, 7);

        let progress: Vec<u8> = summary.projects.iter().map(|p| p.progress).collect();
        assert_eq!(progress, vec![25, 0, 100]);
    }

    #[test]
    fn test_progress_keeps_last_update() {
        let mut source = row("Alpha", 2, 1);
        source.updated_at = "2026-03-01T09:30:00Z".parse().unwrap();
        let progress = ProjectProgress::from(source);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["updated_at"], "2026-03-01T09:30:00Z");
        assert_eq!(json["progress"], 50);
    }

    #[test]
    fn test_empty_dashboard() {
        let summary = DashboardSummary::build(Vec::new(), 0, 0);
        assert_eq!(summary.total_projects, 0);
        assert_eq!(summary.total_requirements, 0);
        assert!(summary.projects.is_empty());
    }
}
