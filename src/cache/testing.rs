//! Test doubles for the key-value store.

use async_trait::async_trait;

use super::store::{CacheError, CacheResult, KeyValueStore, ScanPage};

/// A store whose every call fails, as when Redis is down.
pub struct UnreachableStore;

#[async_trait]
impl KeyValueStore for UnreachableStore {
    fn backend(&self) -> &'static str {
        "unreachable"
    }
    async fn get(&self, _: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn set_ex(&self, _: &str, _: &str, _: u64) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn del(&self, _: &[String]) -> CacheResult<u64> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn scan(&self, _: u64, _: &str, _: usize) -> CacheResult<ScanPage> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn incr_window(&self, _: &str, _: u64) -> CacheResult<u64> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
    async fn ping(&self) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}
