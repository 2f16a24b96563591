use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// In-memory fixed-window rate limit state (for single-instance deployments)
/// For multi-instance, use Redis or similar
#[derive(Clone, Default)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if the key is rate limited. Returns Ok(remaining) or Err(retry_after).
    pub async fn check_with_limits(
        &self,
        key: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_secs);

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) > window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= max_requests {
            let retry_after = window.saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(max_requests - entry.count)
    }

    /// Periodically clean up expired entries (call from a background task)
    pub async fn cleanup(&self, window_secs: u64) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_secs * 2); // Keep for 2x window

        entries.retain(|_, entry| now.duration_since(entry.window_start) < window);
    }
}

/// Per-IP rate limiting applied to the whole /api surface.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();

    match state
        .rate_limiter
        .check_with_limits(
            &ip,
            state.config.rate_limit_max,
            state.config.rate_limit_window_secs,
        )
        .await
    {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            let secs: u64 = retry_after.as_secs();
            tracing::warn!(
                ip = %ip,
                retry_after_secs = secs,
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_REQUESTS: u32 = 5;
    const WINDOW_SECS: u64 = 60;

    #[tokio::test]
    async fn allows_under_limit() {
        let limiter = RateLimitState::new();

        for i in 0..MAX_REQUESTS {
            let result = limiter
                .check_with_limits("test_key", MAX_REQUESTS, WINDOW_SECS)
                .await;
            assert!(result.is_ok(), "Request {} should be allowed", i + 1);
        }
    }

    #[tokio::test]
    async fn blocks_over_limit() {
        let limiter = RateLimitState::new();

        // Exhaust the limit
        for _ in 0..MAX_REQUESTS {
            let _ = limiter
                .check_with_limits("test_key", MAX_REQUESTS, WINDOW_SECS)
                .await;
        }

        let result = limiter
            .check_with_limits("test_key", MAX_REQUESTS, WINDOW_SECS)
            .await;
        assert!(result.is_err(), "Request over limit should be blocked");
    }

    #[tokio::test]
    async fn different_keys_have_separate_limits() {
        let limiter = RateLimitState::new();

        // Exhaust limit for key1
        for _ in 0..MAX_REQUESTS {
            let _ = limiter
                .check_with_limits("key1", MAX_REQUESTS, WINDOW_SECS)
                .await;
        }

        let result = limiter
            .check_with_limits("key2", MAX_REQUESTS, WINDOW_SECS)
            .await;
        assert!(result.is_ok(), "Different key should have separate limit");
    }
}
