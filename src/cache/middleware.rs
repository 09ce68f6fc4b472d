//! Route-level response caching for GET endpoints.
//!
//! Attach per route with
//! `middleware::from_fn_with_state(CacheRoute::new(&cache, prefix, ttl), cache_route)`.
//!
//! - cache disabled or non-GET → handler runs untouched, no header
//! - hit → stored status + body, `X-Cache: HIT`, `X-Cache-Key`
//! - miss → handler runs, `X-Cache: MISS`; 2xx bodies are stored in the
//!   background, anything else passes through and is never stored

use axum::{
    body::Body,
    extract::{OriginalUri, Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::keys::route_cache_key;
use super::ResponseCache;
use crate::shared::AuthenticatedUser;

pub const X_CACHE: &str = "x-cache";
pub const X_CACHE_KEY: &str = "x-cache-key";

/// Builds the part of a cache key that follows the route prefix.
pub type KeyBuilder = fn(&Request) -> String;

/// Per-route cache settings, used as middleware state.
#[derive(Clone)]
pub struct CacheRoute {
    cache: ResponseCache,
    prefix: &'static str,
    ttl_secs: u64,
    per_user: bool,
    key_builder: Option<KeyBuilder>,
}

impl CacheRoute {
    pub fn new(cache: &ResponseCache, prefix: &'static str, ttl_secs: u64) -> Self {
        Self {
            cache: cache.clone(),
            prefix,
            ttl_secs,
            per_user: false,
            key_builder: None,
        }
    }

    /// Adds the caller's user id to the key so users never share entries.
    pub fn per_user(mut self) -> Self {
        self.per_user = true;
        self
    }

    /// Replaces the default path-and-query key. The prefix is still
    /// prepended, so `invalidate_prefix` keeps reaching these entries.
    pub fn with_key_builder(mut self, builder: KeyBuilder) -> Self {
        self.key_builder = Some(builder);
        self
    }

    fn key_for(&self, request: &Request) -> String {
        if let Some(build) = self.key_builder {
            return format!("{}:{}", self.prefix, build(request));
        }

        let uri: &Uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|o| &o.0)
            .unwrap_or_else(|| request.uri());

        let query: Vec<(String, String)> = match Query::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(Query(pairs)) => pairs,
            Err(_) => uri
                .query()
                .map(|raw| vec![("_raw".to_string(), raw.to_string())])
                .unwrap_or_default(),
        };

        let user = if self.per_user {
            request
                .extensions()
                .get::<AuthenticatedUser>()
                .map(|u| u.user_id.as_str())
        } else {
            None
        };

        route_cache_key(self.prefix, user, uri.path(), query)
    }
}

/// What is stored per cached response. `body` is the exact response text,
/// so a hit is byte-identical to the miss that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl CachedResponse {
    fn into_hit_response(self, key: &str) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        let content_type = self
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
        if let Ok(value) = HeaderValue::from_str(key) {
            headers.insert(X_CACHE_KEY, value);
        }
        response
    }
}

pub async fn cache_route(State(route): State<CacheRoute>, request: Request, next: Next) -> Response {
    if !route.cache.is_enabled() || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = route.key_for(&request);

    if let Some(cached) = route.cache.get::<CachedResponse>(&key).await {
        metrics::counter!("cache_lookups_total", "prefix" => route.prefix, "result" => "hit")
            .increment(1);
        debug!(key = %key, "response cache hit");
        return cached.into_hit_response(&key);
    }

    metrics::counter!("cache_lookups_total", "prefix" => route.prefix, "result" => "miss")
        .increment(1);

    let response = next.run(request).await;
    let mut response = if response.status().is_success() {
        store_response(&route, key, response).await
    } else {
        response
    };
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static("MISS"));
    response
}

/// Buffers the body, schedules the store, and rebuilds the response.
async fn store_response(route: &CacheRoute, key: String, response: Response) -> Response {
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to buffer response body for caching");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to produce response",
                    "error": "INTERNAL_ERROR"
                })),
            )
                .into_response();
        }
    };

    match std::str::from_utf8(&bytes) {
        Ok(text) => {
            let cached = CachedResponse {
                status_code: parts.status.as_u16(),
                content_type: parts
                    .headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
                body: text.to_string(),
            };
            route.cache.set_detached(key, &cached, route.ttl_secs);
        }
        Err(_) => debug!(key = %key, "Response body is not UTF-8, not cached"),
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::UnreachableStore;
    use crate::cache::{CacheTtl, MemoryStore};
    use axum::{
        extract::Path,
        http::StatusCode,
        middleware,
        routing::get,
        Extension, Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct Calls(Arc<AtomicUsize>);

    async fn list(Extension(calls): Extension<Calls>) -> Json<serde_json::Value> {
        let n = calls.0.fetch_add(1, Ordering::SeqCst);
        Json(json!({"success": true, "data": [n], "zeta": 1, "alpha": 2}))
    }

    async fn missing(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": format!("{id} not found")})),
        )
    }

    fn app(cache: &ResponseCache, calls: Calls) -> Router {
        let route = CacheRoute::new(cache, "items", CacheTtl::MEDIUM);
        Router::new()
            .route(
                "/items",
                get(list)
                    .post(list)
                    .layer(middleware::from_fn_with_state(route.clone(), cache_route)),
            )
            .route(
                "/items/{id}",
                get(missing).layer(middleware::from_fn_with_state(route, cache_route)),
            )
            .layer(Extension(calls))
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (Response, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        (Response::from_parts(parts, Body::empty()), text)
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn second_get_is_a_byte_identical_hit() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let calls = Calls::default();
        let app = app(&cache, calls.clone());

        let (first, first_body) = send(&app, Method::GET, "/items?page=1&limit=5").await;
        assert_eq!(header(&first, X_CACHE), Some("MISS"));
        assert_eq!(header(&first, X_CACHE_KEY), None);
        settle().await;

        let (second, second_body) = send(&app, Method::GET, "/items?limit=5&page=1").await;
        assert_eq!(header(&second, X_CACHE), Some("HIT"));
        assert_eq!(
            header(&second, X_CACHE_KEY),
            Some("items:/items:limit=5&page=1")
        );
        assert_eq!(header(&second, "content-type"), Some("application/json"));
        assert_eq!(first_body, second_body);
        assert_eq!(calls.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_queries_get_different_entries() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let calls = Calls::default();
        let app = app(&cache, calls.clone());

        send(&app, Method::GET, "/items?page=1").await;
        settle().await;
        let (response, _) = send(&app, Method::GET, "/items?page=2").await;
        assert_eq!(header(&response, X_CACHE), Some("MISS"));
        assert_eq!(calls.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_success_responses_are_never_stored() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone());
        let app = app(&cache, Calls::default());

        let (first, _) = send(&app, Method::GET, "/items/7").await;
        assert_eq!(first.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&first, X_CACHE), Some("MISS"));
        settle().await;

        let (second, _) = send(&app, Method::GET, "/items/7").await;
        assert_eq!(header(&second, X_CACHE), Some("MISS"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn non_get_methods_bypass() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone());
        let calls = Calls::default();
        let app = app(&cache, calls.clone());

        let (response, _) = send(&app, Method::POST, "/items").await;
        assert_eq!(header(&response, X_CACHE), None);
        settle().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn disabled_cache_bypasses_without_header() {
        let calls = Calls::default();
        let app = app(&ResponseCache::disabled(), calls.clone());

        for _ in 0..2 {
            let (response, _) = send(&app, Method::GET, "/items").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(header(&response, X_CACHE), None);
        }
        assert_eq!(calls.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_turns_hit_back_into_miss() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let app = app(&cache, Calls::default());

        send(&app, Method::GET, "/items").await;
        settle().await;
        let (hit, _) = send(&app, Method::GET, "/items").await;
        assert_eq!(header(&hit, X_CACHE), Some("HIT"));

        assert_eq!(cache.invalidate_prefix("items").await, 1);
        let (miss, _) = send(&app, Method::GET, "/items").await;
        assert_eq!(header(&miss, X_CACHE), Some("MISS"));
    }

    #[tokio::test]
    async fn unreachable_store_serves_every_request_from_the_handler() {
        async fn stable(Extension(calls): Extension<Calls>) -> Json<serde_json::Value> {
            calls.0.fetch_add(1, Ordering::SeqCst);
            Json(json!({"success": true, "data": ["stable"]}))
        }

        let cache = ResponseCache::new(Arc::new(UnreachableStore));
        let calls = Calls::default();
        let route = CacheRoute::new(&cache, "items", CacheTtl::MEDIUM);
        let app = Router::new()
            .route(
                "/items",
                get(stable).layer(middleware::from_fn_with_state(route, cache_route)),
            )
            .layer(Extension(calls.clone()));

        let (first, first_body) = send(&app, Method::GET, "/items?page=1").await;
        settle().await;
        let (second, second_body) = send(&app, Method::GET, "/items?page=1").await;

        for response in [&first, &second] {
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(header(response, X_CACHE), Some("MISS"));
        }
        assert_eq!(first_body, second_body);
        assert_eq!(calls.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn custom_key_builder_keeps_the_prefix() {
        fn by_locale(request: &Request) -> String {
            let locale = request
                .headers()
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("en");
            format!("{}:{locale}", request.uri().path())
        }

        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let calls = Calls::default();
        let route = CacheRoute::new(&cache, "items", CacheTtl::MEDIUM).with_key_builder(by_locale);
        let app = Router::new()
            .route(
                "/items",
                get(list).layer(middleware::from_fn_with_state(route, cache_route)),
            )
            .layer(Extension(calls.clone()));

        let request = |lang: &'static str| {
            Request::builder()
                .uri("/items?page=1")
                .header(header::ACCEPT_LANGUAGE, lang)
                .body(Body::empty())
                .unwrap()
        };

        app.clone().oneshot(request("ar")).await.unwrap();
        settle().await;

        let hit = app.clone().oneshot(request("ar")).await.unwrap();
        assert_eq!(header(&hit, X_CACHE), Some("HIT"));
        assert_eq!(header(&hit, X_CACHE_KEY), Some("items:/items:ar"));

        let other = app.clone().oneshot(request("en")).await.unwrap();
        assert_eq!(header(&other, X_CACHE), Some("MISS"));
        assert_eq!(calls.0.load(Ordering::SeqCst), 2);
        settle().await;

        assert_eq!(cache.invalidate_prefix("items").await, 2);
    }

    #[tokio::test]
    async fn per_user_routes_key_by_user() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let route = CacheRoute::new(&cache, "items", CacheTtl::MEDIUM).per_user();

        let as_user = |id: &'static str| {
            Router::new()
                .route(
                    "/items",
                    get(list).layer(middleware::from_fn_with_state(route.clone(), cache_route)),
                )
                .layer(Extension(Calls::default()))
                .layer(Extension(AuthenticatedUser::new(id, "Admin")))
        };

        send(&as_user("1"), Method::GET, "/items").await;
        settle().await;

        let (same_user, _) = send(&as_user("1"), Method::GET, "/items").await;
        assert_eq!(header(&same_user, X_CACHE), Some("HIT"));
        assert_eq!(header(&same_user, X_CACHE_KEY), Some("items:u1:/items:default"));

        let (other_user, _) = send(&as_user("2"), Method::GET, "/items").await;
        assert_eq!(header(&other_user, X_CACHE), Some("MISS"));
    }
}
