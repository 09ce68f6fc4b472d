//! # Sadara API
//!
//! Back-office REST API for a sports agency: players, clubs and dashboard
//! statistics, with a Redis-backed cache-aside response layer.
//!
//! ## Architecture
//!
//! - **domain**: entities, list filters and repository traits
//! - **application**: use-case services (cache-aside reads, invalidating writes)
//! - **infrastructure**: SeaORM entities, migrations and repositories
//! - **cache**: key-value store abstraction, key building, route cache middleware
//! - **interfaces**: HTTP router, handlers, middleware and OpenAPI docs
//! - **shared**: error type, pagination normalizer, shutdown signal

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use cache::{KeyValueStore, MemoryStore, RedisStore, ResponseCache};
pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::{create_api_router, AppState};
