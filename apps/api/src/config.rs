use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::rate_limit::{RateLimitConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS};
use crate::auth::token::SessionSecret;

pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: SessionSecret,
    /// True when SESSION_SECRET was unset and the development fallback is in use.
    pub using_dev_secret: bool,
    pub login_rate_limit: RateLimitConfig,
    pub login_sweep_interval: Duration,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let (session_secret, using_dev_secret) = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => (SessionSecret::new(secret), false),
            _ => (SessionSecret::new(DEV_SESSION_SECRET), true),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            session_secret,
            using_dev_secret,
            login_rate_limit: RateLimitConfig {
                window_ms: parse_env("LOGIN_RATE_LIMIT_WINDOW_MS", DEFAULT_WINDOW_MS)?,
                max_attempts: parse_env("LOGIN_RATE_LIMIT_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            },
            // tokio intervals reject a zero period
            login_sweep_interval: Duration::from_secs(
                parse_env("LOGIN_RATE_LIMIT_SWEEP_SECS", 300u64)?.max(1),
            ),
            cookie_secure: parse_env("COOKIE_SECURE", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
