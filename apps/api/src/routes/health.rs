use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports app liveness and database reachability. 503 when the database is down.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let timestamp = Utc::now().to_rfc3339();

    if db_up {
        (
            StatusCode::OK,
            Json(json!({ "status": "ok", "app": "up", "db": "up", "timestamp": timestamp })),
        )
    } else {
        tracing::warn!("Health check failed to reach the database");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "app": "up", "db": "down", "timestamp": timestamp })),
        )
    }
}
