//! HTTP request metrics
//!
//! - `http_requests_total{method, path, status, cache}`
//! - `http_request_duration_seconds{method, path, cache}`
//!
//! `path` is the matched route template (`/api/v1/players/{id}`) so ids do
//! not explode label cardinality. `cache` is the `X-Cache` outcome (`hit`,
//! `miss`) or `none` for routes the response cache does not cover, which
//! lets dashboards compare hit and miss latency directly.

use std::time::Instant;

use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};

use crate::cache::middleware::X_CACHE;

fn cache_outcome(response: &Response) -> &'static str {
    match response.headers().get(X_CACHE).map(|v| v.as_bytes()) {
        Some(b"HIT") => "hit",
        Some(b"MISS") => "miss",
        _ => "none",
    }
}

pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    let cache = cache_outcome(&response);
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status,
        "cache" => cache
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "cache" => cache
    )
    .record(elapsed);

    response
}
