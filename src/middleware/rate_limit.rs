use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{connect_info::ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::RateLimitPolicy;

/// Windows are pruned once this many client keys are tracked.
const PRUNE_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
    /// Requests waiting for the next window; they are counted against it.
    queued: u32,
}

#[derive(Debug, PartialEq)]
enum Decision {
    Allow,
    Wait(Duration),
    Reject { retry_after_secs: u64 },
}

/// Fixed-window limiter for one named policy, keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    policy: Arc<RateLimitPolicy>,
    enabled: bool,
    trusted_proxies: Arc<Vec<IpAddr>>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy, enabled: bool) -> Self {
        Self {
            policy: Arc::new(policy),
            enabled,
            trusted_proxies: Arc::new(Vec::new()),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Believe forwarding headers only when the socket peer is one of these.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::new(proxies);
        self
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    fn window_length(&self) -> Duration {
        Duration::from_secs(self.policy.window_secs.max(1))
    }

    fn acquire(&self, key: &str, now: Instant) -> Decision {
        let length = self.window_length();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < length * 2);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
            queued: 0,
        });

        let elapsed = now.duration_since(window.started);
        if elapsed >= length {
            // Queued requests were promised a slot in the window that follows.
            window.count = if elapsed < length * 2 { window.queued } else { 0 };
            window.queued = 0;
            window.started = now;
        }

        let remaining = length.saturating_sub(now.duration_since(window.started));
        if window.count < self.policy.permit_limit {
            window.count += 1;
            Decision::Allow
        } else if window.queued < self.policy.queue_limit {
            window.queued += 1;
            Decision::Wait(remaining)
        } else {
            Decision::Reject {
                retry_after_secs: ceil_seconds(remaining).max(1),
            }
        }
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// The socket peer, unless that peer is a trusted proxy, in which case the
/// first `X-Forwarded-For` entry or `X-Real-IP` is used instead.
fn client_key(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let Some(peer) = peer else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let headers = request.headers();
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .and_then(|first| parse_ip(first.trim()))
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| parse_ip(raw.trim()))
        })
        .unwrap_or(peer)
        .to_string()
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

fn too_many_requests(retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Too many requests. Please try again later.",
            "statusCode": 429,
            "retryAfterSeconds": retry_after_secs,
        })),
    )
        .into_response();
    response.headers_mut().insert(
        RETRY_AFTER,
        HeaderValue::from_str(&retry_after_secs.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("1")),
    );
    response
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.enabled {
        return next.run(request).await;
    }

    let key = client_key(&request, &limiter.trusted_proxies);
    match limiter.acquire(&key, Instant::now()) {
        Decision::Allow => {}
        Decision::Wait(delay) => {
            debug!(
                policy = %limiter.policy.name,
                client = %key,
                "Queued for {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
        Decision::Reject { retry_after_secs } => {
            warn!(
                policy = %limiter.policy.name,
                client = %key,
                "Rate limit exceeded, retry after {}s",
                retry_after_secs
            );
            return too_many_requests(retry_after_secs);
        }
    }

    next.run(request).await
}
