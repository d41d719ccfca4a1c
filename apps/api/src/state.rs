use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::rate_limit::LoginRateLimiter;
use crate::auth::token::TokenCodec;
use crate::config::Config;
use crate::rfp::ingest::DocumentTextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub tokens: Arc<TokenCodec>,
    /// Process-wide login attempt windows. Swept in the background by `spawn_sweeper`.
    pub login_limiter: Arc<LoginRateLimiter>,
    /// Pluggable document decoder. Default: PlainTextExtractor.
    pub text_extractor: Arc<dyn DocumentTextExtractor>,
}
