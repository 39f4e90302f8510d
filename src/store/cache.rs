// src/store/cache.rs

//! Time-based result cache.
//!
//! Entries are keyed by a fingerprint of the operation name and its
//! serialized parameters, and stay valid while `now - stored_at < ttl`.
//! There is no eviction beyond expiry and explicit invalidation.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

/// Default lifetime of a cached fetch.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Deterministic fingerprint of `(operation, params)`.
pub fn cache_key<P: Serialize + ?Sized>(operation: &str, params: &P) -> String {
    let encoded = serde_json::to_string(params).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(b"\n");
    hasher.update(encoded.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// TTL cache private to one store.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`; expired entries are dropped on access.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if !fresh {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, pruning expired entries first.
    pub fn insert(&mut self, key: String, value: V) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry regardless of age.
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

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryParams;

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("events.list", &QueryParams::page(1, 10));
        let b = cache_key("events.list", &QueryParams::page(1, 10));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cache_key_separates_operation_and_params() {
        let params = QueryParams::page(1, 10);
        assert_ne!(
            cache_key("events.list", &params),
            cache_key("news.list", &params)
        );
        assert_ne!(
            cache_key("events.list", &params),
            cache_key("events.list", &QueryParams::page(2, 10))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(300));
        cache.insert("k".to_string(), 7);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_prunes_expired_entries() {
        let mut cache = TtlCache::new(Duration::from_secs(300));
        for i in 0..100 {
            cache.insert(format!("k{i}"), i);
            tokio::time::advance(Duration::from_secs(301)).await;
        }
        assert_eq!(cache.len(), 1);

        cache.insert("last".to_string(), 100);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("last"), Some(100));
    }

    #[tokio::test]
    async fn test_clear_drops_fresh_entries() {
        let mut cache = TtlCache::default();
        cache.insert("k".to_string(), "v");
        cache.clear();
        assert_eq!(cache.get("k"), None);
    }
}
