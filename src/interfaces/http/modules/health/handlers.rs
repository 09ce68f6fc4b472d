//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::cache::ResponseCache;
use crate::infrastructure::database;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub cache: ResponseCache,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheHealth {
    /// `redis`, `memory` or `disabled`
    pub backend: String,
    /// `ok`, `error` or `disabled`
    pub status: String,
    pub latency_ms: Option<u64>,
}

async fn check_cache(cache: &ResponseCache) -> CacheHealth {
    let backend = cache.backend().to_string();
    let Some(store) = cache.store() else {
        return CacheHealth {
            backend,
            status: "disabled".to_string(),
            latency_ms: None,
        };
    };

    let start = Instant::now();
    match store.ping().await {
        Ok(()) => CacheHealth {
            backend,
            status: "ok".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            CacheHealth {
                backend,
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    }
}

/// A failing cache is reported but does not degrade the service; reads fall
/// through to the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let db_start = Instant::now();
    let database = match database::ping(&state.db).await {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    };
    let cache = check_cache(&state.cache).await;

    let healthy = database.status == "ok";
    let http_status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
            cache,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::UnreachableStore;
    use crate::cache::MemoryStore;
    use crate::infrastructure::{init_database, DatabaseConfig};

    async fn state(cache: ResponseCache) -> HealthState {
        HealthState {
            db: init_database(&DatabaseConfig::sqlite_memory()).await.unwrap(),
            cache,
            started_at: Arc::new(Instant::now()),
        }
    }

    #[tokio::test]
    async fn healthy_with_memory_cache() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let (status, Json(body)) = health_check(State(state(cache).await)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.cache.backend, "memory");
        assert_eq!(body.cache.status, "ok");
    }

    #[tokio::test]
    async fn broken_cache_does_not_degrade() {
        let cache = ResponseCache::new(Arc::new(UnreachableStore));
        let (status, Json(body)) = health_check(State(state(cache).await)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.cache.status, "error");
    }

    #[tokio::test]
    async fn disabled_cache_is_reported() {
        let (_, Json(body)) = health_check(State(state(ResponseCache::disabled()).await)).await;
        assert_eq!(body.cache.backend, "disabled");
        assert_eq!(body.cache.status, "disabled");
    }
}
