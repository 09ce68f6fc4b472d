//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, key-value store, REST API and graceful shutdown. The binary
//! in `main.rs` is a thin CLI wrapper around it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::cache::{KeyValueStore, MemoryStore, RedisStore, ResponseCache};
use crate::config::{AppConfig, RedisConfig, StoreBackend};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::ShutdownSignal;

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Handle to a running API server.
pub struct ServerHandle {
    pub config: AppConfig,
    /// Address the listener actually bound (useful with port 0).
    pub local_addr: SocketAddr,
    /// Backend the response cache ended up on after startup fallbacks.
    pub cache_backend: &'static str,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process; later
/// starts reuse it. `None` when another recorder was installed first.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

/// Builds the key-value store behind the cache and the rate limiter.
///
/// An unreachable Redis is not fatal: the service starts without a store
/// (every read goes to the database, rate limiting passes) and logs why.
pub async fn build_store(config: &RedisConfig) -> Option<Arc<dyn KeyValueStore>> {
    match config.backend {
        StoreBackend::Disabled => {
            info!("Key-value store disabled");
            None
        }
        StoreBackend::Memory => {
            info!("Using in-process memory store");
            Some(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let timeout = Duration::from_secs(config.connect_timeout_secs.max(1));
            match RedisStore::connect(&config.url, timeout).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!(
                        error = %e,
                        "Failed to connect to Redis. Continuing without response cache."
                    );
                    None
                }
            }
        }
    }
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting Sadara API...");

        let prometheus = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig::from(&app_cfg.database)).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Cache / rate-limit store ───────────────────────────
        let store = build_store(&app_cfg.redis).await;
        let cache = match (&store, app_cfg.cache.enabled) {
            (Some(store), true) => ResponseCache::new(store.clone())
                .with_scan_batch_size(app_cfg.cache.scan_batch_size),
            _ => ResponseCache::disabled(),
        };
        let cache_backend = cache.backend();
        info!(backend = cache_backend, "Response cache ready");

        // ── REST API ───────────────────────────────────────────
        let mut state = AppState::new(db.clone(), cache, app_cfg.pagination.limits())
            .with_rate_limit(store, app_cfg.rate_limit.clone());
        if let Some(handle) = prometheus {
            state = state.with_metrics(handle);
        }
        let router = create_api_router(state);

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            cache_backend,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Triggers shutdown on SIGINT / SIGTERM.
    pub fn install_signal_handler(&self) {
        self.shutdown.listen_for_os_signals();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Waits for in-flight requests to drain (bounded by
    /// `server.shutdown_timeout`), then closes the database.
    pub async fn wait(self) {
        let timeout = Duration::from_secs(self.config.server.shutdown_timeout);
        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout elapsed with requests still in flight"
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Sadara API shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initializes tracing from `[logging]`. `RUST_LOG` overrides the level.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
