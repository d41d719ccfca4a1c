//! Persistence for projects, their requirements and the answer library.
//! Every query is scoped to the owning user.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::answer::AnswerRow;
use crate::models::project::{ProjectProgressRow, ProjectRow, RequirementRow};
use crate::rfp::drafting::AnswerSnippet;
use crate::rfp::extractor::ParsedRequirement;
use crate::rfp::status::{ProjectStatus, RequirementStatus};
use crate::validation::NewProject;

pub async fn create_project(
    pool: &PgPool,
    owner_id: Uuid,
    project: &NewProject,
) -> sqlx::Result<ProjectRow> {
    sqlx::query_as(
        "INSERT INTO projects (owner_id, name, description, status) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(owner_id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(ProjectStatus::Intake.as_str())
    .fetch_one(pool)
    .await
}

pub async fn list_projects(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<ProjectRow>> {
    sqlx::query_as("SELECT * FROM projects WHERE owner_id = $1 ORDER BY updated_at DESC")
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

pub async fn find_project(
    pool: &PgPool,
    owner_id: Uuid,
    project_id: Uuid,
) -> sqlx::Result<Option<ProjectRow>> {
    sqlx::query_as("SELECT * FROM projects WHERE id = $1 AND owner_id = $2")
        .bind(project_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_requirements(
    pool: &PgPool,
    project_id: Uuid,
) -> sqlx::Result<Vec<RequirementRow>> {
    sqlx::query_as(
        "SELECT * FROM project_requirements WHERE project_id = $1 ORDER BY position",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Stores a new upload: raw text and status on the project, and the extracted
/// requirements in place of any previous ones. All or nothing.
pub async fn replace_requirements(
    pool: &PgPool,
    project_id: Uuid,
    raw_text: &str,
    requirements: &[ParsedRequirement],
) -> sqlx::Result<Vec<RequirementRow>> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE projects SET raw_text = $1, status = $2, updated_at = now() WHERE id = $3")
        .bind(raw_text)
        .bind(ProjectStatus::after_upload(requirements.len()).as_str())
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM project_requirements WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    let mut rows = Vec::with_capacity(requirements.len());
    for (position, req) in (1i32..).zip(requirements) {
        let row: RequirementRow = sqlx::query_as(
            r#"
            INSERT INTO project_requirements
                (project_id, position, title, details, deadline, priority, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(position)
        .bind(&req.title)
        .bind(&req.details)
        .bind(&req.deadline)
        .bind(req.priority.as_str())
        .bind(RequirementStatus::Todo.as_str())
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}

/// Writes one draft per requirement, marks each `DRAFTED`, and moves the project to `Drafting`.
pub async fn save_drafts(
    pool: &PgPool,
    project_id: Uuid,
    drafts: &[(Uuid, String)],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    for (requirement_id, draft) in drafts {
        sqlx::query(
            "UPDATE project_requirements SET draft = $1, status = $2, updated_at = now() WHERE id = $3 AND project_id = $4",
        )
        .bind(draft)
        .bind(RequirementStatus::Drafted.as_str())
        .bind(requirement_id)
        .bind(project_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE projects SET status = $1, updated_at = now() WHERE id = $2")
        .bind(ProjectStatus::Drafting.as_str())
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Sets a requirement's status if it belongs to one of `owner_id`'s projects.
pub async fn update_requirement_status(
    pool: &PgPool,
    owner_id: Uuid,
    requirement_id: Uuid,
    status: RequirementStatus,
) -> sqlx::Result<Option<RequirementRow>> {
    let mut tx = pool.begin().await?;

    let row: Option<RequirementRow> = sqlx::query_as(
        r#"
        UPDATE project_requirements r
        SET status = $1, updated_at = now()
        FROM projects p
        WHERE r.id = $2 AND r.project_id = p.id AND p.owner_id = $3
        RETURNING r.*
        "#,
    )
    .bind(status.as_str())
    .bind(requirement_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(row) = &row {
        sqlx::query("UPDATE projects SET updated_at = now() WHERE id = $1")
            .bind(row.project_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(row)
}

pub async fn list_answers(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<AnswerRow>> {
    sqlx::query_as("SELECT * FROM answers WHERE owner_id = $1 ORDER BY created_at, id")
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

/// The owner's answer library in stable order, as drafting input.
pub async fn load_library(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<AnswerSnippet>> {
    Ok(list_answers(pool, owner_id)
        .await?
        .into_iter()
        .map(AnswerSnippet::from)
        .collect())
}

pub async fn project_progress(
    pool: &PgPool,
    owner_id: Uuid,
) -> sqlx::Result<Vec<ProjectProgressRow>> {
    sqlx::query_as(
        r#"
        SELECT p.id, p.name, p.status, p.updated_at,
               COUNT(r.id) AS requirement_count,
               COUNT(r.id) FILTER (WHERE r.status = ANY($2)) AS done_count
        FROM projects p
        LEFT JOIN project_requirements r ON r.project_id = p.id
        WHERE p.owner_id = $1
        GROUP BY p.id
        ORDER BY p.updated_at DESC
        "#,
    )
    .bind(owner_id)
    .bind(RequirementStatus::done_labels())
    .fetch_all(pool)
    .await
}

pub async fn count_drafted_requirements(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM project_requirements r
        JOIN projects p ON p.id = r.project_id
        WHERE p.owner_id = $1 AND r.draft IS NOT NULL
        "#,
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

pub async fn count_answers(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await
}
