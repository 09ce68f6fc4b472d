//! Redis-backed [`KeyValueStore`].

use std::time::Duration;

use async_trait::async_trait;
use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use tracing::{debug, info};

use super::store::{CacheError, CacheResult, KeyValueStore, ScanPage};

/// Fixed-window counter in one server-side step: the increment and the
/// expiry can never be separated by a dropped connection. A counter left
/// without a TTL gets one on its next hit.
const INCR_WINDOW_LUA: &str = r#"
local count = redis.call('INCR', KEYS[1])
if redis.call('TTL', KEYS[1]) < 0 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Store over a Redis connection manager. The manager multiplexes one
/// connection and reconnects on its own after failures, so the store is
/// cheap to clone and share between tasks.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    incr_window: ::redis::Script,
}

impl RedisStore {
    /// Connects to `url`, giving up after `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> CacheResult<Self> {
        let client = ::redis::Client::open(url)?;
        let conn = tokio::time::timeout(connect_timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                CacheError::Unavailable(format!(
                    "connection not established within {}ms",
                    connect_timeout.as_millis()
                ))
            })??;

        let store = Self {
            conn,
            incr_window: ::redis::Script::new(INCR_WINDOW_LUA),
        };
        store.ping().await?;
        info!("Redis connected and ready");
        Ok(store)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        debug!(key = %key, ttl_secs, "cache set");
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<ScanPage> {
        let mut conn = self.conn.clone();
        let (cursor, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count.max(1))
            .query_async(&mut conn)
            .await?;
        Ok(ScanPage { cursor, keys })
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        let window = i64::try_from(window_secs.max(1)).unwrap_or(i64::MAX);
        let count: u64 = self
            .incr_window
            .key(key)
            .arg(window)
            .invoke_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
