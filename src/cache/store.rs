//! Key-value store abstraction behind the response cache and rate limiter.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Value at {0} is not an integer")]
    NotAnInteger(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// One page of a cursor-driven key scan. `cursor == 0` means the scan is
/// complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Minimal command set the cache layer needs from the backing store.
///
/// Each operation is atomic on its own; callers never rely on atomicity
/// across operations.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// `GET key`.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// `SETEX key ttl value`.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// `DEL key [key ...]`, returning the number of keys removed.
    async fn del(&self, keys: &[String]) -> CacheResult<u64>;

    /// `SCAN cursor MATCH pattern COUNT count`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<ScanPage>;

    /// `INCR key`, setting `EXPIRE key window_secs` when the counter has no
    /// expiry yet. Both happen as one atomic step. Returns the counter value
    /// after the increment.
    async fn incr_window(&self, key: &str, window_secs: u64) -> CacheResult<u64>;

    /// Round-trip check used by health reporting.
    async fn ping(&self) -> CacheResult<()>;
}
