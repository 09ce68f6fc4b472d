//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `middleware`: request id, rate limiting, request metrics
//! - `modules`: players, clubs, dashboard, health, metrics
//! - `router`: route table, per-route cache layers and Swagger docs

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, AppState};
