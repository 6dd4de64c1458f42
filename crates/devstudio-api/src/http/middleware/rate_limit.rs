//! Fixed-window rate limiting keyed by client address.
//!
//! The client key is the first `x-forwarded-for` entry, then `x-real-ip`;
//! requests carrying neither share one bucket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use crate::http::error::AppError;

const SHARED_BUCKET: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-client request counters. Cheap to clone; clones share counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            window,
            max_requests,
        }
    }

    /// Count one request for `key`. On rejection returns the seconds until
    /// the window resets.
    pub fn check(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let window = entry.value_mut();
        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(window.started));
            return Err(remaining.as_secs().max(1));
        }
        window.count += 1;
        Ok(())
    }

    /// Drop windows that have expired.
    pub fn prune(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Client key for rate limiting.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .unwrap_or(SHARED_BUCKET)
        .to_string()
}

/// Middleware rejecting requests over the per-client budget with 429.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers());
    match limiter.check(&key, Instant::now()) {
        Ok(()) => next.run(request).await,
        Err(retry_after_secs) => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

/// Periodically drop expired windows so idle clients do not accumulate.
pub fn spawn_pruner(limiter: RateLimiter) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            limiter.prune(Instant::now());
        }
    })
}
