//! Cache-aside response layer.
//!
//! [`ResponseCache`] is the process-wide handle to the shared key-value
//! store. It is built once at startup and passed to services and
//! middleware; tests build their own over a [`MemoryStore`].
//!
//! The cache is an optimization only: every store failure is logged at
//! `warn` and reported as a miss / failed write, never as an error.

pub mod keys;
pub mod memory;
pub mod middleware;
pub mod redis;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

pub use keys::{build_cache_key, prefix_pattern, route_cache_key, CachePrefix};
pub use memory::MemoryStore;
pub use middleware::{cache_route, CacheRoute, CachedResponse, KeyBuilder};
pub use self::redis::RedisStore;
pub use store::{CacheError, CacheResult, KeyValueStore, ScanPage};

/// TTL tiers in seconds.
pub struct CacheTtl;

impl CacheTtl {
    /// Volatile data (dashboard stats).
    pub const SHORT: u64 = 60;
    /// Lists (players, clubs).
    pub const MEDIUM: u64 = 300;
    /// Rarely changing data.
    pub const LONG: u64 = 900;
    /// Reference data.
    pub const HOUR: u64 = 3600;
    /// Static lookups.
    pub const DAY: u64 = 86400;
}

/// Keys examined per `SCAN` round during prefix invalidation.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 100;

#[derive(Clone)]
pub struct ResponseCache {
    store: Option<Arc<dyn KeyValueStore>>,
    scan_batch_size: usize,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: Some(store),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }

    /// A cache with no backing store: every lookup misses, every write is
    /// skipped, middleware bypasses entirely.
    pub fn disabled() -> Self {
        Self {
            store: None,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }

    pub fn with_scan_batch_size(mut self, batch: usize) -> Self {
        self.scan_batch_size = batch.max(1);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn backend(&self) -> &'static str {
        self.store.as_ref().map(|s| s.backend()).unwrap_or("disabled")
    }

    pub fn store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.store.as_ref()
    }

    /// Reads and decodes a cached value. Store or decoding failures are
    /// treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        let raw = match store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache GET failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Cached value could not be decoded");
                None
            }
        }
    }

    /// Encodes and stores `value` for `ttl_secs`. Returns whether the write
    /// succeeded.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache value could not be encoded");
                return false;
            }
        };
        write(store.as_ref(), key, &payload, ttl_secs).await
    }

    /// Stores `value` on a spawned task so the caller is never delayed.
    pub fn set_detached<T: Serialize + ?Sized>(&self, key: String, value: &T, ttl_secs: u64) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache value could not be encoded");
                return;
            }
        };
        tokio::spawn(async move {
            write(store.as_ref(), &key, &payload, ttl_secs).await;
        });
    }

    pub async fn del(&self, key: &str) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        match store.del(&[key.to_string()]).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache DEL failed");
                false
            }
        }
    }

    /// Deletes every key under `prefix` using a cursor-driven scan in
    /// batches of `scan_batch_size`. Returns the number of keys deleted;
    /// on failure, the number deleted before the failure.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let Some(store) = self.store.as_ref() else {
            return 0;
        };
        let pattern = prefix_pattern(prefix);
        let mut cursor = 0u64;
        let mut deleted = 0usize;

        loop {
            let page = match store.scan(cursor, &pattern, self.scan_batch_size).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, deleted, "Cache invalidation scan failed");
                    return deleted;
                }
            };

            if !page.keys.is_empty() {
                if let Err(e) = store.del(&page.keys).await {
                    warn!(pattern = %pattern, error = %e, deleted, "Cache invalidation delete failed");
                    return deleted;
                }
                deleted += page.keys.len();
            }

            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        if deleted > 0 {
            metrics::counter!("cache_invalidated_keys_total", "prefix" => prefix.to_string())
                .increment(deleted as u64);
            info!(pattern = %pattern, deleted, "Cache invalidated");
        }
        deleted
    }

    /// Invalidates several prefixes concurrently, for mutations that touch
    /// more than one resource. Returns the total number of keys deleted.
    pub async fn invalidate_many(&self, prefixes: &[&str]) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        join_all(prefixes.iter().map(|p| self.invalidate_prefix(p)))
            .await
            .into_iter()
            .sum()
    }

    /// Cache-aside accessor: returns the cached value for `key`, or runs
    /// `fetch`, stores its result in the background and returns it.
    ///
    /// Errors from `fetch` propagate; cache errors never do.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl_secs: u64, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            debug!(key = %key, "cache hit");
            return Ok(cached);
        }

        let value = fetch().await?;
        self.set_detached(key.to_string(), &value, ttl_secs);
        Ok(value)
    }
}

async fn write(store: &dyn KeyValueStore, key: &str, payload: &str, ttl_secs: u64) -> bool {
    match store.set_ex(key, payload, ttl_secs).await {
        Ok(()) => true,
        Err(e) => {
            warn!(key = %key, error = %e, "Cache SET failed");
            false
        }
    }
}
