//! Request middleware: fixed-window rate limiting and the `debug` verbose
//! request log.
//!
//! No off-the-shelf crate fits a simple per-IP fixed-window limiter, so this
//! is hand-rolled as a small stateful middleware: a `dashmap`-backed counter
//! keyed by client IP, checked via `axum::middleware::from_fn_with_state`.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window request counter, one window per client IP.
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    max: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `max` requests per `window` per IP.
    #[must_use]
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max,
            window,
        }
    }

    /// Records a request from `ip`, returning `true` if it is within the
    /// current window's budget.
    fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(ip).or_insert_with(|| Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max
    }
}

/// Axum middleware applying `RateLimiter` to every request. Requests with no
/// resolvable peer address (e.g. in tests that skip `ConnectInfo`) are never
/// throttled - the limiter only protects the network-facing listener.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<std::net::SocketAddr>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(ConnectInfo(addr)) = connect_info {
        if !limiter.check(addr.ip()) {
            return StatusCode::TOO_MANY_REQUESTS.into_response();
        }
    }
    next.run(request).await
}

/// Axum middleware logging method, URI, and response status at `info` level.
/// Only mounted when the hub's `debug` option is enabled (§6); otherwise
/// `TraceLayer`'s default per-request `debug`-level spans are all a hub
/// emits.
pub async fn verbose_request_log(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    log::info!("{method} {uri} -> {}", response.status());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn allows_up_to_max_requests_per_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn tracks_each_ip_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check(a));
        assert!(limiter.check(b));
        assert!(!limiter.check(a));
    }

    #[test]
    fn resets_after_window_elapses() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check(ip));
    }
}
