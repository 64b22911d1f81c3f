//! In-memory response cache with a freshness window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default freshness for APOD entries; content for a past date never changes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Cache keyed by a canonical string (an ISO date, or `latest`).
#[derive(Debug, Clone)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get_fresh(&self, key: &str) -> Option<V> {
        self.get_fresh_at(key, Instant::now())
    }

    /// Fresh value for `key` as seen at `now`.
    pub fn get_fresh_at(&self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        let age = now.saturating_duration_since(entry.inserted_at);
        (age < self.ttl).then(|| entry.value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: impl Into<String>, value: V, now: Instant) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn purge_stale(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_within_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("2024-06-09", 1, t0);

        assert_eq!(cache.get_fresh_at("2024-06-09", t0), Some(1));
        assert_eq!(
            cache.get_fresh_at("2024-06-09", t0 + Duration::from_secs(59)),
            Some(1)
        );
    }

    #[test]
    fn test_stale_after_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("2024-06-09", 1, t0);

        assert_eq!(
            cache.get_fresh_at("2024-06-09", t0 + Duration::from_secs(60)),
            None
        );
    }

    #[test]
    fn test_missing_key() {
        let cache: ResponseCache<u32> = ResponseCache::default();
        assert_eq!(cache.get_fresh("2024-06-09"), None);
        assert_eq!(cache.ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_insert_replaces_and_refreshes() {
        let mut cache = ResponseCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("k", "old", t0);
        cache.insert_at("k", "new", t0 + Duration::from_secs(8));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_fresh_at("k", t0 + Duration::from_secs(15)),
            Some("new")
        );
    }

    #[test]
    fn test_purge_and_invalidate() {
        let mut cache = ResponseCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("a", 1, t0);
        cache.insert_at("b", 2, t0 + Duration::from_secs(5));

        assert_eq!(cache.purge_stale(t0 + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate("b"));
        assert!(!cache.invalidate("b"));
        assert!(cache.is_empty());
    }
}
