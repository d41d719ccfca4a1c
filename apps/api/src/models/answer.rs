use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::rfp::drafting::AnswerSnippet;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub question_key: String,
    pub title: String,
    pub body: String,
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AnswerRow> for AnswerSnippet {
    fn from(row: AnswerRow) -> Self {
        Self {
            title: row.title,
            body: row.body,
            tags: row.tags,
        }
    }
}
