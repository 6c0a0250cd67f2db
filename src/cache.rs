use std::collections::HashMap;
use std::time::{Duration, Instant};

use polars::prelude::DataFrame;

struct CacheEntry {
    table: DataFrame,
    fetched_at: Instant,
}

/// Loaded tables keyed by source address, each valid for `ttl` after fetch.
///
/// Callers pass `now` explicitly so expiry can be driven from tests.
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// A clone of the cached table if it is younger than the TTL.
    /// Stale entries are evicted on lookup.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<DataFrame> {
        let fresh = self
            .entries
            .get(key)
            .map(|e| now.saturating_duration_since(e.fetched_at) < self.ttl)?;
        if fresh {
            self.entries.get(key).map(|e| e.table.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, table: DataFrame, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key.into(),
            CacheEntry {
                table,
                fetched_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn table() -> DataFrame {
        df!("PM10" => [1.0, 2.0]).unwrap()
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let mut cache = TableCache::new(Duration::from_secs(15));
        let t0 = Instant::now();
        cache.insert("http://host/a.csv", table(), t0);

        assert!(cache.get("http://host/a.csv", t0 + Duration::from_secs(14)).is_some());
        assert!(cache.get("http://host/a.csv", t0 + Duration::from_secs(15)).is_none());
        // stale entry evicted
        assert!(cache.is_empty());
    }

    #[test]
    fn keyed_by_address() {
        let mut cache = TableCache::new(Duration::from_secs(15));
        let t0 = Instant::now();
        cache.insert("a", table(), t0);
        assert!(cache.get("b", t0).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut cache = TableCache::new(Duration::from_secs(15));
        let t0 = Instant::now();
        cache.insert("a", table(), t0);
        cache.clear();
        cache.clear();
        cache.invalidate("a");
        assert!(cache.get("a", t0).is_none());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let mut cache = TableCache::new(Duration::ZERO);
        cache.insert("a", table(), Instant::now());
        assert!(cache.is_empty());
    }
}
