//! Fixed-window rate limiting backed by the shared key-value store.
//!
//! Counters live under `rl:{scope}:{client}` and expire with the window, so
//! every instance behind a load balancer shares the same budget. When the
//! store is missing or failing, requests pass.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::cache::KeyValueStore;
use crate::config::RateLimitConfig;
use crate::shared::AppError;

pub const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";

#[derive(Clone)]
pub struct RateLimitState {
    store: Option<Arc<dyn KeyValueStore>>,
    scope: &'static str,
    window_secs: u64,
    max_requests: u64,
}

impl RateLimitState {
    /// `None` store or `enabled = false` turns the limiter into a pass-through.
    pub fn new(
        store: Option<Arc<dyn KeyValueStore>>,
        config: &RateLimitConfig,
        scope: &'static str,
    ) -> Self {
        Self {
            store: store.filter(|_| config.enabled),
            scope,
            window_secs: config.window_secs.max(1),
            max_requests: config.max_requests,
        }
    }
}

/// First `X-Forwarded-For` hop, else the peer address, else `unknown`.
fn client_id(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(client) = forwarded {
        return client.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(store) = state.store.as_ref() else {
        return next.run(request).await;
    };

    let key = format!("rl:{}:{}", state.scope, client_id(&request));
    let count = match store.incr_window(&key, state.window_secs).await {
        Ok(count) => count,
        Err(e) => {
            warn!(key = %key, error = %e, "Rate limit store failed, allowing request");
            return next.run(request).await;
        }
    };

    let remaining = state.max_requests.saturating_sub(count);
    let mut response = if count > state.max_requests {
        metrics::counter!("rate_limit_rejections_total", "scope" => state.scope).increment(1);
        warn!(key = %key, count, "Rate limit exceeded");
        AppError::RateLimited {
            retry_after_secs: state.window_secs,
        }
        .into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(state.max_requests));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    response
}
