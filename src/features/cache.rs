//! Query feature cache.
//!
//! Memoizes extraction results per exact raw query string. Entries expire
//! `ttl` after insertion. When an insert finds the cache full, expired
//! entries are dropped first and then the oldest quarter of the remainder.
//!
//! The cache is injected into the recommender rather than living in a
//! global. A single mutex serializes every operation; callers extract
//! features outside the lock and insert the finished value afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ahash::AHashMap;
use log::debug;
use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::features::query::QueryFeatures;

#[derive(Debug)]
struct CacheEntry {
    features: Arc<QueryFeatures>,
    created: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: AHashMap<String, CacheEntry>,
    /// Insertion order: (created, seq) → key.
    order: BTreeMap<(Instant, u64), String>,
    next_seq: u64,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&(entry.created, entry.seq));
        Some(entry)
    }

    fn evict_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let expired: Vec<(Instant, u64)> = self
            .order
            .keys()
            .take_while(|(created, _)| now.saturating_duration_since(*created) >= ttl)
            .copied()
            .collect();

        for slot in &expired {
            if let Some(key) = self.order.remove(slot) {
                self.entries.remove(&key);
            }
        }
        expired.len()
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let mut evicted = 0;
        while evicted < count {
            let Some((_, key)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&key);
            evicted += 1;
        }
        evicted
    }
}

/// Time-bounded, size-bounded cache of extracted query features.
#[derive(Debug)]
pub struct QueryCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    max_size: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl QueryCache {
    /// Create a cache with the given entry lifetime and capacity.
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        QueryCache {
            state: Mutex::new(CacheState::default()),
            ttl,
            max_size: max_size.max(1),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_size)
    }

    /// Look up a query, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<Arc<QueryFeatures>> {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) against an explicit clock reading.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<QueryFeatures>> {
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.created) < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.features));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert finished features for a query.
    pub fn put(&self, key: &str, features: Arc<QueryFeatures>) {
        self.put_at(key, features, Instant::now());
    }

    /// [`put`](Self::put) against an explicit clock reading.
    pub fn put_at(&self, key: &str, features: Arc<QueryFeatures>, now: Instant) {
        let mut state = self.state.lock();

        // Replacing an entry never needs room.
        state.remove(key);

        if state.entries.len() >= self.max_size {
            let expired = state.evict_expired(now, self.ttl);
            let mut evicted = 0;
            if state.entries.len() >= self.max_size {
                evicted = state.evict_oldest(self.max_size.div_ceil(4));
            }
            debug!("query cache full: dropped {expired} expired and {evicted} oldest entries");
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.insert((now, seq), key.to_string());
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                features,
                created: now,
                seq,
            },
        );
    }

    /// Drop every entry older than the TTL; returns how many were removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        self.state.lock().evict_expired(now, self.ttl)
    }

    /// Number of physically stored entries (expired ones included).
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
            max_size: self.max_size,
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Cache performance statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
    pub max_size: usize,
}

impl CacheStats {
    /// Calculate hit ratio.
    pub fn hit_ratio(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(text: &str) -> Arc<QueryFeatures> {
        Arc::new(QueryFeatures {
            original: text.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_get_put() {
        let cache = QueryCache::new(Duration::from_secs(60), 10);
        assert!(cache.get("water").is_none());

        cache.put("water", features("water"));
        assert_eq!(cache.get("water").unwrap().original, "water");
        // keys are case-sensitive
        assert!(cache.get("Water").is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_expiry() {
        let cache = QueryCache::new(Duration::from_secs(10), 10);
        let start = Instant::now();

        cache.put_at("a", features("a"), start);
        assert!(cache.get_at("a", start + Duration::from_secs(9)).is_some());
        assert!(cache.get_at("a", start + Duration::from_secs(10)).is_none());
        // the expired entry was dropped on lookup
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_evict_expired() {
        let cache = QueryCache::new(Duration::from_secs(10), 10);
        let start = Instant::now();

        cache.put_at("old", features("old"), start);
        cache.put_at("new", features("new"), start + Duration::from_secs(8));

        let removed = cache.evict_expired(start + Duration::from_secs(12));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("new", start + Duration::from_secs(12)).is_some());
    }

    #[test]
    fn test_overflow_evicts_oldest_quarter() {
        let max = 8;
        let cache = QueryCache::new(Duration::from_secs(3600), max);
        let start = Instant::now();

        for i in 0..=max {
            cache.put_at(&format!("q{i}"), features(&format!("q{i}")), start + Duration::from_millis(i as u64));
        }

        // 8 entries, 2 evicted, then the 9th inserted
        assert_eq!(cache.len(), max - 2 + 1);
        let now = start + Duration::from_secs(1);
        assert!(cache.get_at("q0", now).is_none());
        assert!(cache.get_at("q1", now).is_none());
        assert!(cache.get_at("q2", now).is_some());
        assert!(cache.get_at("q8", now).is_some());
    }

    #[test]
    fn test_overflow_prefers_expired() {
        let cache = QueryCache::new(Duration::from_secs(10), 4);
        let start = Instant::now();

        cache.put_at("stale", features("stale"), start);
        for i in 0..3 {
            cache.put_at(&format!("fresh{i}"), features("fresh"), start + Duration::from_secs(20));
        }
        cache.put_at("newest", features("newest"), start + Duration::from_secs(21));

        assert_eq!(cache.len(), 4);
        assert!(cache.get_at("fresh0", start + Duration::from_secs(21)).is_some());
    }

    #[test]
    fn test_concurrent_access() {
        let max = 64;
        let cache = QueryCache::new(Duration::from_secs(3600), max);
        let threads = 8;
        let per_thread = 50;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..per_thread {
                        let key = format!("t{t} q{i}");
                        if cache.get(&key).is_none() {
                            cache.put(&key, features(&key));
                        }
                        if let Some(found) = cache.get(&key) {
                            assert_eq!(found.original, key);
                        }
                        cache.evict_expired(Instant::now());
                    }
                });
            }
        });

        assert!(cache.len() <= max);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, threads * per_thread * 2);
        assert!(stats.misses >= threads * per_thread);
    }

    #[test]
    fn test_replace_keeps_single_entry() {
        let cache = QueryCache::new(Duration::from_secs(60), 2);
        cache.put("a", features("first"));
        cache.put("a", features("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().original, "second");

        cache.clear();
        assert!(cache.is_empty());
    }
}
