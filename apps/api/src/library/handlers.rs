use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::models::answer::AnswerRow;
use crate::rfp::store::list_answers;
use crate::state::AppState;
use crate::validation::validate_answer;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_key: String,
    pub title: String,
    pub body: String,
    pub tags: Option<String>,
}

/// GET /api/v1/answers
pub async fn handle_list_answers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<AnswerRow>>, AppError> {
    Ok(Json(list_answers(&state.db, user.id).await?))
}

/// POST /api/v1/answers
pub async fn handle_create_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<AnswerRow>), AppError> {
    let answer = validate_answer(&req.question_key, &req.title, &req.body, req.tags.as_deref())?;

    let row: AnswerRow = sqlx::query_as(
        r#"
        INSERT INTO answers (owner_id, question_key, title, body, tags)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&answer.question_key)
    .bind(&answer.title)
    .bind(&answer.body)
    .bind(&answer.tags)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(answer_id = %row.id, "Added library answer");
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/answers/:id
pub async fn handle_update_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerRow>, AppError> {
    let answer = validate_answer(&req.question_key, &req.title, &req.body, req.tags.as_deref())?;

    let row: Option<AnswerRow> = sqlx::query_as(
        r#"
        UPDATE answers
        SET question_key = $1, title = $2, body = $3, tags = $4, updated_at = now()
        WHERE id = $5 AND owner_id = $6
        RETURNING *
        "#,
    )
    .bind(&answer.question_key)
    .bind(&answer.title)
    .bind(&answer.body)
    .bind(&answer.tags)
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Answer {id} not found")))
}

/// DELETE /api/v1/answers/:id
pub async fn handle_delete_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM answers WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Answer {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
