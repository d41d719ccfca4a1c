pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::library::handlers as library;
use crate::rfp::handlers as rfp;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Projects
        .route(
            "/api/v1/projects",
            get(rfp::handle_list_projects).post(rfp::handle_create_project),
        )
        .route("/api/v1/projects/:id", get(rfp::handle_get_project))
        .route(
            "/api/v1/projects/:id/rfp",
            post(rfp::handle_upload_rfp).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/projects/:id/drafts", post(rfp::handle_generate_drafts))
        .route(
            "/api/v1/requirements/:id/status",
            patch(rfp::handle_update_requirement_status),
        )
        .route("/api/v1/dashboard", get(rfp::handle_dashboard))
        // Answer library
        .route(
            "/api/v1/answers",
            get(library::handle_list_answers).post(library::handle_create_answer),
        )
        .route(
            "/api/v1/answers/:id",
            put(library::handle_update_answer).delete(library::handle_delete_answer),
        )
        .with_state(state)
}
