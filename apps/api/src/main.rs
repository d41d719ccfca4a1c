mod auth;
mod config;
mod db;
mod errors;
mod library;
mod models;
mod rfp;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::rate_limit::{spawn_sweeper, LoginRateLimiter};
use crate::auth::token::TokenCodec;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::rfp::ingest::PlainTextExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RFP API v{}", env!("CARGO_PKG_VERSION"));
    if config.using_dev_secret {
        warn!("SESSION_SECRET is not set; sessions are signed with the development secret");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let tokens = Arc::new(TokenCodec::new(&config.session_secret)?);

    let login_limiter = Arc::new(LoginRateLimiter::new(config.login_rate_limit));
    spawn_sweeper(login_limiter.clone(), config.login_sweep_interval);
    info!(
        window_ms = config.login_rate_limit.window_ms,
        max_attempts = config.login_rate_limit.max_attempts,
        "Login rate limiter initialized"
    );

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        tokens,
        login_limiter,
        text_extractor: Arc::new(PlainTextExtractor),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
