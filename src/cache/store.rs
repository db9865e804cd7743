//! In-memory response cache for idempotent reads.
//!
//! Entries are evicted strictly in insertion order. Reads use `peek` and
//! overwrites use `peek_mut`, so the underlying LRU list never reorders and its
//! least-recent slot is always the oldest-inserted key.

use std::sync::{Arc, Mutex};

use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

use crate::util::lock::mutex_lock;

use super::clock::{Clock, SystemClock};
use super::config::CacheConfig;
use super::keys::CacheKey;

const SOURCE: &str = "cache::store";

struct CacheEntry {
    payload: Value,
    stored_at: OffsetDateTime,
}

/// Time-bounded, size-bounded store of successful read payloads.
///
/// Payloads are handed out as clones; entries never leave the cache by
/// reference.
pub struct ResponseCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = Mutex::new(LruCache::new(config.capacity_non_zero()));
        Self {
            config,
            clock,
            entries,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the payload stored under `key` if it is still fresh.
    ///
    /// A stale entry is reported as absent but left in place until it is
    /// overwritten or evicted.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let now = self.clock.now();
        let entries = mutex_lock(&self.entries, SOURCE, "get");
        match entries.peek(key) {
            Some(entry) if now - entry.stored_at < self.config.ttl => {
                counter!("inkpost_cache_hit_total").increment(1);
                debug!(cache = "response", outcome = "hit", key = %key, "serving cached payload");
                Some(entry.payload.clone())
            }
            Some(_) => {
                counter!("inkpost_cache_stale_total").increment(1);
                debug!(cache = "response", outcome = "stale", key = %key, "cached payload expired");
                None
            }
            None => {
                counter!("inkpost_cache_miss_total").increment(1);
                debug!(cache = "response", outcome = "miss", key = %key, "no cached payload");
                None
            }
        }
    }

    /// Store `payload` under `key` stamped with the current time.
    ///
    /// Returns the key evicted to stay within capacity, if any. Overwriting an
    /// existing key keeps its original position in the eviction order.
    pub fn put(&self, key: CacheKey, payload: Value) -> Option<CacheKey> {
        let stored_at = self.clock.now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "put");

        if let Some(existing) = entries.peek_mut(&key) {
            existing.payload = payload;
            existing.stored_at = stored_at;
            return None;
        }

        let evicted = entries
            .push(key, CacheEntry { payload, stored_at })
            .map(|(evicted_key, _)| evicted_key);
        if let Some(evicted_key) = evicted.as_ref() {
            counter!("inkpost_cache_evict_total").increment(1);
            debug!(cache = "response", evicted = %evicted_key, "evicted oldest entry");
        }
        evicted
    }

    pub fn clear(&self) {
        mutex_lock(&self.entries, SOURCE, "clear").clear();
        debug!(cache = "response", "cache cleared");
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::time::Duration;

    use metrics_util::debugging::DebuggingRecorder;
    use serde_json::json;

    use super::super::clock::ManualClock;
    use super::*;

    fn cache_with(capacity: usize, ttl: Duration) -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let config = CacheConfig {
            capacity,
            ttl,
            ..Default::default()
        };
        let cache = ResponseCache::with_clock(config, clock.clone());
        (cache, clock)
    }

    fn key(path: &str) -> CacheKey {
        CacheKey::for_request(path, &[])
    }

    #[test]
    fn put_then_get_returns_payload() {
        let (cache, _) = cache_with(50, Duration::from_secs(300));
        cache.put(key("/api/posts"), json!({"posts": []}));
        assert_eq!(cache.get(&key("/api/posts")), Some(json!({"posts": []})));
    }

    #[test]
    fn entry_expires_at_window_edge() {
        let (cache, clock) = cache_with(50, Duration::from_secs(300));
        cache.put(key("/a"), json!(1));

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get(&key("/a")), Some(json!(1)));

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&key("/a")).is_none());
        // Stale entries stay until superseded.
        assert_eq!(cache.len(), 1);

        cache.put(key("/a"), json!(2));
        assert_eq!(cache.get(&key("/a")), Some(json!(2)));
    }

    #[test]
    fn eviction_removes_oldest_inserted() {
        let (cache, _) = cache_with(2, Duration::from_secs(300));
        assert!(cache.put(key("/1"), json!(1)).is_none());
        assert!(cache.put(key("/2"), json!(2)).is_none());

        // Reading the oldest entry must not protect it.
        assert!(cache.get(&key("/1")).is_some());

        let evicted = cache.put(key("/3"), json!(3));
        assert_eq!(evicted, Some(key("/1")));
        assert!(cache.get(&key("/1")).is_none());
        assert!(cache.get(&key("/2")).is_some());
        assert!(cache.get(&key("/3")).is_some());
    }

    #[test]
    fn overwrite_keeps_insertion_position() {
        let (cache, _) = cache_with(2, Duration::from_secs(300));
        cache.put(key("/1"), json!(1));
        cache.put(key("/2"), json!(2));
        assert!(cache.put(key("/1"), json!(10)).is_none());

        let evicted = cache.put(key("/3"), json!(3));
        assert_eq!(evicted, Some(key("/1")));
        assert_eq!(cache.get(&key("/2")), Some(json!(2)));
    }

    #[test]
    fn clear_empties_cache() {
        let (cache, _) = cache_with(50, Duration::from_secs(300));
        cache.put(key("/1"), json!(1));
        cache.put(key("/2"), json!(2));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&key("/1")).is_none());
    }

    #[test]
    fn cache_paths_emit_expected_metric_keys() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let (cache, clock) = cache_with(1, Duration::from_secs(10));
            assert!(cache.get(&key("/a")).is_none());
            cache.put(key("/a"), json!(1));
            assert!(cache.get(&key("/a")).is_some());
            clock.advance(Duration::from_secs(11));
            assert!(cache.get(&key("/a")).is_none());
            cache.put(key("/b"), json!(2));
        });

        let names: HashSet<String> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
            .collect();

        for metric in [
            "inkpost_cache_hit_total",
            "inkpost_cache_miss_total",
            "inkpost_cache_stale_total",
            "inkpost_cache_evict_total",
        ] {
            assert!(names.contains(metric), "missing metric: {metric}");
        }
    }

    #[test]
    fn cache_recovers_from_poisoned_lock() {
        let (cache, _) = cache_with(50, Duration::from_secs(300));

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.lock().expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        cache.put(key("/a"), json!(1));
        assert!(cache.get(&key("/a")).is_some());
    }
}
