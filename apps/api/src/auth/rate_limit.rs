//! Login rate limiter: in-memory attempt windows keyed by normalized identity.
//!
//! Each identity gets a window that opens on its first attempt and lasts
//! `window_ms`. Within a window at most `max_attempts` attempts are allowed;
//! further attempts are denied until the window elapses, without extending it.
//! State is per process and lost on restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;

pub const DEFAULT_WINDOW_MS: u64 = 10 * 60 * 1000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Outcome of a single recorded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// 0 when allowed; otherwise time until the active window closes.
    pub retry_after_ms: u64,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after_ms: 0,
        }
    }

    fn deny(retry_after_ms: u64) -> Self {
        Self {
            allowed: false,
            retry_after_ms,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LoginAttemptWindow {
    count: u32,
    window_start_ms: i64,
}

impl LoginAttemptWindow {
    fn open(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start_ms: now_ms,
        }
    }

    /// Elapsed time since the window opened. A clock that stepped backwards counts as 0.
    fn age_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(now_ms.saturating_sub(self.window_start_ms)).unwrap_or(0)
    }
}

/// Trims and case-folds a credential identifier into a limiter key.
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Process-wide table of login attempt windows.
///
/// Updates for one key are serialized by the map's entry lock, so concurrent
/// attempts can never push a window past `max_attempts`.
#[derive(Debug)]
pub struct LoginRateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, LoginAttemptWindow>,
}

impl LoginRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub fn record_attempt(&self, identity: &str) -> RateLimitDecision {
        self.record_attempt_at(identity, now_ms())
    }

    /// Records an attempt at an explicit `now_ms`.
    pub fn record_attempt_at(&self, identity: &str, now_ms: i64) -> RateLimitDecision {
        let key = normalize_identity(identity);

        match self.windows.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(LoginAttemptWindow::open(now_ms));
                RateLimitDecision::allow()
            }
            Entry::Occupied(mut slot) => {
                let window = slot.get_mut();
                let age = window.age_ms(now_ms);

                if age >= self.config.window_ms {
                    *window = LoginAttemptWindow::open(now_ms);
                    RateLimitDecision::allow()
                } else if window.count >= self.config.max_attempts {
                    RateLimitDecision::deny(self.config.window_ms - age)
                } else {
                    window.count += 1;
                    RateLimitDecision::allow()
                }
            }
        }
    }

    /// Forgets all attempts for `identity`.
    pub fn clear(&self, identity: &str) {
        self.windows.remove(&normalize_identity(identity));
    }

    /// Attempts counted in the identity's current window, if one is tracked.
    pub fn attempts(&self, identity: &str) -> Option<u32> {
        self.windows
            .get(&normalize_identity(identity))
            .map(|w| w.count)
    }

    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(now_ms())
    }

    /// Drops every window that has fully elapsed at `now_ms`. Returns how many were removed.
    pub fn sweep_expired_at(&self, now_ms: i64) -> usize {
        let window_ms = self.config.window_ms;
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let keep = window.age_ms(now_ms) < window_ms;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

/// Spawns a background task that sweeps expired windows every `interval`.
pub fn spawn_sweeper(limiter: Arc<LoginRateLimiter>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = limiter.tracked_identities(),
                    "Swept expired login windows"
                );
            }
        }
    })
}
