//! Fixed-window rate limiting keyed by client address.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::warn;

use gatehouse_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip::client_ip;
use crate::state::AppState;

/// Path that gets the stricter login budget.
pub const LOGIN_PATH: &str = "/api/auth/login";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per key in fixed windows.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window` for each key.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
        }
    }

    /// Count one request for `key`.
    ///
    /// Returns `Err` with the time until the window resets once the
    /// budget is spent.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return Err(self.window.saturating_sub(now.duration_since(entry.started)));
        }
        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have already expired.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    /// Number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

fn too_many_requests(message: &str, retry_after: Duration) -> Response {
    let mut response = ApiError(AppError::rate_limit(message)).into_response();
    let seconds = retry_after.as_secs().max(1);
    if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

/// Applies the global limit to every request and the login limit to
/// `POST /api/auth/login`.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let ip = client_ip(request.headers(), request.extensions());

    if let Err(retry_after) = state.rate_limiter.check(&ip) {
        warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        return too_many_requests("Too many requests, please try again later", retry_after);
    }

    if request.method() == Method::POST && request.uri().path() == LOGIN_PATH {
        if let Err(retry_after) = state.login_limiter.check(&ip) {
            warn!(ip = %ip, "Login rate limit exceeded");
            return too_many_requests(
                "Too many login attempts, please try again later",
                retry_after,
            );
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_budget_per_key() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_err());
        // Other clients have their own window.
        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check("a").is_ok());

        let retry_after = limiter.check("a").unwrap_err();
        assert!(retry_after <= Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.check("a").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let limiter = RateLimiter::new(Duration::from_secs(10), 5);
        limiter.check("a").unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        limiter.check("b").unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        limiter.purge_expired();
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
