//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{
    http_metrics_middleware, rate_limit_middleware, request_id_middleware, RateLimitState,
};
use super::modules::{clubs, dashboard, health, metrics, players};
use crate::application::{ClubService, DashboardService, DashboardStats, PlayerService};
use crate::cache::{cache_route, CachePrefix, CacheRoute, CacheTtl, KeyValueStore, ResponseCache};
use crate::config::RateLimitConfig;
use crate::domain::{ClubRepository, PlayerRepository};
use crate::infrastructure::database::repositories::{SeaOrmClubRepository, SeaOrmPlayerRepository};
use crate::shared::{PaginationLimits, PaginationMeta, SortOrder};

/// Everything the HTTP layer needs. Handlers extract their own slice via
/// `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: ResponseCache,
    pub players: Arc<PlayerService>,
    pub clubs: Arc<ClubService>,
    pub dashboard: Arc<DashboardService>,
    /// Counter store for the rate limiter; independent of whether response
    /// caching is enabled.
    pub rate_limit_store: Option<Arc<dyn KeyValueStore>>,
    pub rate_limit: RateLimitConfig,
    pub metrics: Option<PrometheusHandle>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    /// Wires the SeaORM repositories and services over one connection and
    /// one cache handle. Rate limiting uses the cache store and is disabled
    /// until configured with [`AppState::with_rate_limit`].
    pub fn new(db: DatabaseConnection, cache: ResponseCache, limits: PaginationLimits) -> Self {
        let player_repo: Arc<dyn PlayerRepository> =
            Arc::new(SeaOrmPlayerRepository::new(db.clone()));
        let club_repo: Arc<dyn ClubRepository> = Arc::new(SeaOrmClubRepository::new(db.clone()));

        Self {
            players: Arc::new(PlayerService::new(
                player_repo.clone(),
                club_repo.clone(),
                cache.clone(),
                limits,
            )),
            clubs: Arc::new(ClubService::new(
                club_repo.clone(),
                player_repo.clone(),
                cache.clone(),
                limits,
            )),
            dashboard: Arc::new(DashboardService::new(player_repo, club_repo, cache.clone())),
            rate_limit_store: cache.store().cloned(),
            rate_limit: RateLimitConfig {
                enabled: false,
                ..RateLimitConfig::default()
            },
            metrics: None,
            started_at: Arc::new(Instant::now()),
            db,
            cache,
        }
    }

    pub fn with_rate_limit(
        mut self,
        store: Option<Arc<dyn KeyValueStore>>,
        config: RateLimitConfig,
    ) -> Self {
        self.rate_limit_store = store;
        self.rate_limit = config;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl FromRef<AppState> for players::PlayerHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            service: Arc::clone(&s.players),
        }
    }
}

impl FromRef<AppState> for clubs::ClubHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            service: Arc::clone(&s.clubs),
        }
    }
}

impl FromRef<AppState> for dashboard::DashboardHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            service: Arc::clone(&s.dashboard),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            db: s.db.clone(),
            cache: s.cache.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Players
        players::list_players,
        players::get_player,
        players::create_player,
        players::update_player,
        players::delete_player,
        // Clubs
        clubs::list_clubs,
        clubs::get_club,
        clubs::create_club,
        clubs::update_club,
        clubs::delete_club,
        // Dashboard
        dashboard::dashboard_stats,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginationMeta,
            SortOrder,
            players::PlayerDto,
            players::CreatePlayerRequest,
            players::UpdatePlayerRequest,
            clubs::ClubDto,
            clubs::CreateClubRequest,
            clubs::UpdateClubRequest,
            DashboardStats,
            health::HealthResponse,
            health::ComponentHealth,
            health::CacheHealth,
        )
    ),
    tags(
        (name = "Health", description = "Database and cache status"),
        (name = "Players", description = "Player roster. Reads are cached and carry `X-Cache`"),
        (name = "Clubs", description = "Club registry. Reads are cached and carry `X-Cache`"),
        (name = "Dashboard", description = "Aggregated counts"),
    ),
    info(
        title = "Sadara Sports Agency API",
        version = "1.0.0",
        description = "Back-office API for players, clubs and dashboard statistics"
    )
)]
pub struct ApiDoc;

fn player_routes(cache: &ResponseCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(players::list_players)
                .layer(middleware::from_fn_with_state(
                    CacheRoute::new(cache, CachePrefix::PLAYERS, CacheTtl::MEDIUM),
                    cache_route,
                ))
                .post(players::create_player),
        )
        .route(
            "/{id}",
            get(players::get_player)
                .layer(middleware::from_fn_with_state(
                    CacheRoute::new(cache, CachePrefix::PLAYER, CacheTtl::MEDIUM),
                    cache_route,
                ))
                .patch(players::update_player)
                .delete(players::delete_player),
        )
}

fn club_routes(cache: &ResponseCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(clubs::list_clubs)
                .layer(middleware::from_fn_with_state(
                    CacheRoute::new(cache, CachePrefix::CLUBS, CacheTtl::HOUR),
                    cache_route,
                ))
                .post(clubs::create_club),
        )
        .route(
            "/{id}",
            get(clubs::get_club)
                .layer(middleware::from_fn_with_state(
                    CacheRoute::new(cache, CachePrefix::CLUB, CacheTtl::HOUR),
                    cache_route,
                ))
                .patch(clubs::update_club)
                .delete(clubs::delete_club),
        )
}

/// Builds the full application router.
///
/// `/api/v1/*` is rate limited per client; `/health`, `/metrics` and the
/// docs are not.
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let rate_limit = RateLimitState::new(
        state.rate_limit_store.clone(),
        &state.rate_limit,
        "api",
    );

    let api_routes = Router::new()
        .nest("/players", player_routes(&state.cache))
        .nest("/clubs", club_routes(&state.cache))
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state.clone());

    if let Some(handle) = state.metrics {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        router = router.merge(metrics_routes);
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/players",
            "/api/v1/players/{id}",
            "/api/v1/clubs",
            "/api/v1/clubs/{id}",
            "/api/v1/dashboard/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
