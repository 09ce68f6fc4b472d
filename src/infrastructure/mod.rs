//! Infrastructure layer: database access

pub mod database;

pub use database::{init_database, DatabaseConfig};
