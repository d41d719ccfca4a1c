use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::rate_limit::normalize_identity;
use crate::auth::session::{clear_session_cookie, session_cookie, CurrentUser};
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRow};
use crate::state::AppState;
use crate::validation::{clean_optional, validate_email, validate_password};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn signed_in(state: &AppState, jar: CookieJar, user: &UserRow) -> Result<CookieJar, AppError> {
    let token = state
        .tokens
        .issue(&user.id.to_string())
        .map_err(|e| AppError::Internal(anyhow!(e)))?;
    Ok(jar.add(session_cookie(token, state.config.cookie_secure)))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>), AppError> {
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;
    let name = clean_optional(req.name.as_deref());

    let password_hash = hash_password(req.password).await?;

    let inserted: Result<UserRow, sqlx::Error> = sqlx::query_as(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "Registered account");
    let jar = signed_in(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

/// POST /api/v1/auth/login
///
/// Every attempt counts against the email's window, including ones that
/// later succeed. A successful login clears the window.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserProfile>), AppError> {
    let key = normalize_identity(&req.email);

    let decision = state.login_limiter.record_attempt(&key);
    if !decision.allowed {
        tracing::warn!(
            retry_after_ms = decision.retry_after_ms,
            "Login attempt rate limited"
        );
        return Err(AppError::RateLimited {
            retry_after_ms: decision.retry_after_ms,
        });
    }

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&key)
        .fetch_optional(&state.db)
        .await?;

    let Some(user) = user else {
        tracing::warn!(
            attempts = state.login_limiter.attempts(&key),
            "Login failed: unknown email"
        );
        return Err(AppError::Unauthorized);
    };

    if !verify_password(req.password, user.password_hash.clone()).await? {
        tracing::warn!(
            user_id = %user.id,
            attempts = state.login_limiter.attempts(&key),
            "Login failed: wrong password"
        );
        return Err(AppError::Unauthorized);
    }

    state.login_limiter.clear(&key);
    tracing::info!(user_id = %user.id, "Signed in");
    let jar = signed_in(&state, jar, &user)?;
    Ok((jar, Json(user.into())))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, jar.remove(clear_session_cookie()))
}

/// GET /api/v1/auth/me
pub async fn handle_me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
