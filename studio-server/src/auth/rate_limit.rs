//! Fixed-window rate limiting per client IP for login and public write routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

/// Per-route request budget
#[derive(Debug, Clone, Copy)]
pub struct Limit {
    pub route: &'static str,
    pub max_requests: u32,
    pub window_secs: u64,
}

pub const LOGIN: Limit = Limit { route: "login", max_requests: 5, window_secs: 60 };
pub const BOOKING: Limit = Limit { route: "booking", max_requests: 10, window_secs: 60 };
pub const CHALLENGE: Limit = Limit { route: "challenge", max_requests: 5, window_secs: 60 };
pub const CHECKOUT: Limit = Limit { route: "checkout", max_requests: 10, window_secs: 60 };
pub const ANALYTICS: Limit = Limit { route: "analytics", max_requests: 120, window_secs: 60 };

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(&self, limit: Limit, ip: &str) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(limit.route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= limit.window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= limit.max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked_ips(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// Client IP: X-Forwarded-For first (reverse proxy), then the peer address.
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn enforce(state: &AppState, limit: Limit, request: Request, next: Next) -> Result<Response, Response> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check(limit, &ip).await {
        tracing::warn!(route = limit.route, ip = %ip, "Rate limit exceeded");
        return Err(AppError::new(ErrorCode::RateLimited)
            .with_detail("retry_after_secs", limit.window_secs)
            .into_response());
    }
    Ok(next.run(request).await)
}

/// Admin login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, LOGIN, request, next).await
}

/// Booking creation: 10 requests/minute per IP
pub async fn booking_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, BOOKING, request, next).await
}

/// Sending a photo challenge: 5 requests/minute per IP
pub async fn challenge_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, CHALLENGE, request, next).await
}

/// Gift card checkout and voucher lookups: 10 requests/minute per IP
pub async fn checkout_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, CHECKOUT, request, next).await
}

/// Analytics tracking: 120 events/minute per IP
pub async fn analytics_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    enforce(&state, ANALYTICS, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..LOGIN.max_requests {
            assert!(limiter.check(LOGIN, "10.0.0.1").await);
        }
        assert!(!limiter.check(LOGIN, "10.0.0.1").await);
    }

    #[tokio::test]
    async fn routes_and_ips_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..LOGIN.max_requests {
            limiter.check(LOGIN, "10.0.0.1").await;
        }
        assert!(!limiter.check(LOGIN, "10.0.0.1").await);
        assert!(limiter.check(LOGIN, "10.0.0.2").await);
        assert!(limiter.check(BOOKING, "10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets() {
        let limiter = RateLimiter::new();
        for _ in 0..=CHALLENGE.max_requests {
            limiter.check(CHALLENGE, "10.0.0.1").await;
        }
        assert!(!limiter.check(CHALLENGE, "10.0.0.1").await);

        tokio::time::advance(std::time::Duration::from_secs(CHALLENGE.window_secs)).await;
        assert!(limiter.check(CHALLENGE, "10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new();
        limiter.check(ANALYTICS, "10.0.0.1").await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 1);

        tokio::time::advance(std::time::Duration::from_secs(301)).await;
        limiter.check(BOOKING, "10.0.0.2").await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 1);
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&request), "203.0.113.7");

        let request = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&request), "unknown");
    }
}
