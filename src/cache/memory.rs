//! In-process key-value store for development and tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::store::{CacheError, CacheResult, KeyValueStore, ScanPage};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
    /// Insertion sequence; SCAN cursors are expressed in this space so that
    /// deleting keys mid-scan never skips the remaining ones.
    seq: u64,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// `DashMap`-backed store with TTL expiry and cursor-stable `SCAN`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    next_seq: AtomicU64,
    scan_calls: AtomicUsize,
    writes: AtomicUsize,
}

/// Expired entries are swept once per this many writes.
const PURGE_EVERY_WRITES: usize = 1024;

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of live (non-expired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many `SCAN` calls this store has served.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// Drops every expired entry.
    fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, e| !e.is_expired(now));
    }

    fn record_write(&self) {
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_EVERY_WRITES == 0 {
            self.purge_expired();
        }
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        None
    }
}

/// Redis-style glob match supporting `*` and `?`.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.live_value(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            seq: self.next_seq(),
        };
        self.entries.insert(key.to_string(), entry);
        self.record_write();
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> CacheResult<u64> {
        let now = Instant::now();
        let removed = keys
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .filter(|(_, e)| !e.is_expired(now))
            .count();
        Ok(removed as u64)
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if cursor == 0 {
            self.purge_expired();
        }
        let now = Instant::now();

        let mut candidates: Vec<(u64, String, bool)> = self
            .entries
            .iter()
            .filter(|e| e.seq > cursor)
            .map(|e| (e.seq, e.key().clone(), e.is_expired(now)))
            .collect();
        candidates.sort_unstable_by_key(|(seq, _, _)| *seq);

        let count = count.max(1);
        let has_more = candidates.len() > count;
        candidates.truncate(count);

        let next_cursor = if has_more {
            candidates.last().map(|(seq, _, _)| *seq).unwrap_or(0)
        } else {
            0
        };

        let keys = candidates
            .into_iter()
            .filter(|(_, key, expired)| !expired && glob_match(pattern, key))
            .map(|(_, key, _)| key)
            .collect();

        Ok(ScanPage {
            cursor: next_cursor,
            keys,
        })
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> CacheResult<u64> {
        let now = Instant::now();
        let fresh = |seq| Entry {
            value: "0".to_string(),
            expires_at: Some(now + Duration::from_secs(window_secs)),
            seq,
        };

        let next = {
            let mut entry = self
                .entries
                .entry(key.to_string())
                .or_insert_with(|| fresh(self.next_seq()));
            if entry.is_expired(now) {
                *entry = fresh(self.next_seq());
            }

            let current: u64 = entry
                .value
                .parse()
                .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
            let next = current + 1;
            entry.value = next.to_string();
            next
        };
        if next == 1 {
            self.record_write();
        }
        Ok(next)
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_patterns() {
        assert!(glob_match("players:*", "players:a=1&b=2"));
        assert!(glob_match("players:*", "players:"));
        assert!(!glob_match("players:*", "player:42"));
        assert!(!glob_match("player:*", "players:all"));
        assert!(glob_match("p?ayer:*", "player:1"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("a*c*e", "abcde"));
        assert!(!glob_match("a*c*e", "abcd"));
    }

    #[tokio::test]
    async fn set_get_del_roundtrip() {
        let store = MemoryStore::new();
        store.set_ex("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.del(&["k".into(), "missing".into()]).await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn zero_ttl_entries_expire_immediately() {
        let store = MemoryStore::new();
        store.set_ex("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn scan_pages_by_count_and_filters_pattern() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.set_ex(&format!("players:{i}"), "x", 60).await.unwrap();
            store.set_ex(&format!("clubs:{i}"), "x", 60).await.unwrap();
        }

        let mut cursor = 0;
        let mut found = Vec::new();
        loop {
            let page = store.scan(cursor, "players:*", 3).await.unwrap();
            found.extend(page.keys);
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }
        found.sort();
        assert_eq!(found.len(), 5);
        assert!(found.iter().all(|k| k.starts_with("players:")));
        assert_eq!(store.scan_calls(), 4);
    }

    #[tokio::test]
    async fn expired_entries_are_purged_by_a_new_scan() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store.set_ex(&format!("players:{i}"), "x", 0).await.unwrap();
        }
        store.set_ex("players:live", "x", 60).await.unwrap();
        assert_eq!(store.entries.len(), 4);

        let page = store.scan(0, "clubs:*", 100).await.unwrap();
        assert!(page.keys.is_empty());
        assert_eq!(store.entries.len(), 1);
        assert!(store.entries.contains_key("players:live"));
    }

    #[tokio::test]
    async fn writes_periodically_purge_expired_entries() {
        let store = MemoryStore::new();
        for i in 0..PURGE_EVERY_WRITES - 1 {
            store.set_ex(&format!("stale:{i}"), "x", 0).await.unwrap();
        }
        assert_eq!(store.entries.len(), PURGE_EVERY_WRITES - 1);

        store.set_ex("fresh", "x", 60).await.unwrap();
        assert_eq!(store.entries.len(), 1);
    }

    #[tokio::test]
    async fn scan_survives_deletes_between_pages() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store.set_ex(&format!("k:{i}"), "x", 60).await.unwrap();
        }

        let first = store.scan(0, "k:*", 4).await.unwrap();
        store.del(&first.keys).await.unwrap();
        let second = store.scan(first.cursor, "k:*", 4).await.unwrap();
        store.del(&second.keys).await.unwrap();
        let third = store.scan(second.cursor, "k:*", 4).await.unwrap();

        assert_eq!(first.keys.len() + second.keys.len() + third.keys.len(), 10);
        assert_eq!(third.cursor, 0);
    }

    #[tokio::test]
    async fn incr_window_counts_and_resets_after_expiry() {
        let store = MemoryStore::new();
        assert_eq!(store.incr_window("rl:a", 60).await.unwrap(), 1);
        assert_eq!(store.incr_window("rl:a", 60).await.unwrap(), 2);

        assert_eq!(store.incr_window("rl:b", 0).await.unwrap(), 1);
        assert_eq!(store.incr_window("rl:b", 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn incr_on_non_integer_value_fails() {
        let store = MemoryStore::new();
        store.set_ex("k", "text", 60).await.unwrap();
        assert!(matches!(
            store.incr_window("k", 60).await,
            Err(CacheError::NotAnInteger(_))
        ));
    }
}
