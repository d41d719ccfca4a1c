use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::token::{InvalidToken, TokenCodec};
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "rfp_session";

/// Session cookie carrying a signed token. No max-age: it lives for the browser session.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Removal template for the session cookie; pass to `CookieJar::remove`.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Invalid(InvalidToken),
    Authenticated(String),
}

/// Reads and verifies the session cookie, without touching the database.
pub fn read_session(jar: &CookieJar, codec: &TokenCodec) -> SessionStatus {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionStatus::Anonymous;
    };
    match codec.verify(cookie.value()) {
        Ok(identity) => SessionStatus::Authenticated(identity.to_string()),
        Err(reason) => SessionStatus::Invalid(reason),
    }
}

/// The signed-in account. Use as an extractor; rejects with 401 otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let identity = match read_session(&jar, &state.tokens) {
            SessionStatus::Authenticated(identity) => identity,
            SessionStatus::Anonymous => return Err(AppError::Unauthorized),
            SessionStatus::Invalid(reason) => {
                tracing::warn!(%reason, "Rejected session cookie");
                return Err(AppError::Unauthorized);
            }
        };

        let Ok(user_id) = Uuid::parse_str(&identity) else {
            tracing::warn!("Session identity is not a user id");
            return Err(AppError::Unauthorized);
        };

        let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;

        match user {
            Some(user) => Ok(CurrentUser {
                id: user.id,
                email: user.email,
                name: user.name,
            }),
            None => {
                tracing::warn!(%user_id, "Session refers to a missing account");
                Err(AppError::Unauthorized)
            }
        }
    }
}
