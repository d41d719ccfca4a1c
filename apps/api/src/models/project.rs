use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub raw_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub position: i32,
    pub title: String,
    pub details: String,
    pub deadline: Option<String>,
    pub priority: String,
    pub status: String,
    pub draft: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-project requirement counts used by the dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectProgressRow {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub requirement_count: i64,
    pub done_count: i64,
}
