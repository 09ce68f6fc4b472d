//! Application configuration.
//!
//! Loaded from a TOML file (default `~/.config/sadara-api/config.toml`), then
//! overridden by environment variables (`DATABASE_URL`, `REDIS_URL`, `PORT`,
//! `LOG_LEVEL`) and finally by CLI flags in `main`. Every section and field
//! has a default, so a partial file (or no file at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::PaginationLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// `~/.config/sadara-api/config.toml`, or `./config.toml` when no config dir exists.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("sadara-api").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests after a shutdown signal.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./sadara.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 10,
        }
    }
}

/// Which key-value store backs the response cache and the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// `COUNT` hint for each `SCAN` during prefix invalidation.
    pub scan_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_batch_size: crate::cache::DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        let limits = PaginationLimits::default();
        Self {
            default_limit: limits.default_limit,
            max_limit: limits.max_limit,
        }
    }
}

impl PaginationConfig {
    pub fn limits(&self) -> PaginationLimits {
        PaginationLimits::new(self.default_limit, self.max_limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_requests: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 900,
            max_requests: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// `"json"` or `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path` (defaults when it does not exist) and applies environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Applies `DATABASE_URL`, `REDIS_URL`, `PORT` and `LOG_LEVEL` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(url) = lookup("REDIS_URL").filter(|v| !v.is_empty()) {
            self.redis.url = url;
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port })?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
        Ok(())
    }
}
