//! Cache storage: the `ArtworkCache` contract and its in-memory TTL
//! implementation.
//!
//! The cache is disposable derived data. Every operation is fallible at the
//! trait level so callers encode "cache soft, store hard" degradation, even
//! though the in-process backend itself cannot fail.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use metrics::counter;
use thiserror::Error;

use crate::domain::entities::{ArtworkRecord, ProductRecord};

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// A cached snapshot: one artwork, a list result, or a product list.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Artwork(ArtworkRecord),
    Artworks(Vec<ArtworkRecord>),
    Products(Vec<ProductRecord>),
}

/// Narrow key-value contract shared by the query services and the refresh
/// worker. Injected rather than referenced as a singleton so tests can
/// substitute fakes.
pub trait ArtworkCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError>;

    fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> Result<(), CacheError>;

    /// Remove one entry by its exact key. A miss is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry (and side index) under `prefix`. Atomic from the
    /// caller's point of view: no partial deletion is ever observable.
    fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;

    fn hash_get(&self, map: &str, field: &str) -> Result<Option<i64>, CacheError>;

    fn hash_put(&self, map: &str, field: &str, value: i64) -> Result<(), CacheError>;

    fn clear(&self) -> Result<(), CacheError>;
}

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process TTL store behind `RwLock`ed maps.
///
/// Expired entries read as misses and are dropped lazily on the next write
/// pass. When the store is at capacity, population is skipped rather than
/// evicting live entries; the refresh worker repopulates on its own cadence.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    maps: RwLock<HashMap<String, HashMap<String, i64>>>,
    capacity: usize,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            maps: RwLock::new(HashMap::new()),
            capacity: config.capacity.max(1),
        }
    }

    fn purge_expired(entries: &mut HashMap<String, Entry>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired(now));
        let dropped = before - entries.len();
        if dropped > 0 {
            counter!("atelier_cache_expired_total").increment(dropped as u64);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }
}

impl ArtworkCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError> {
        let now = Instant::now();
        let hit = {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if !entry.expired(now) => Some(entry.value.clone()),
                _ => None,
            }
        };
        match hit {
            Some(value) => {
                counter!("atelier_cache_hit_total").increment(1);
                Ok(Some(value))
            }
            None => {
                counter!("atelier_cache_miss_total").increment(1);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "set");
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            Self::purge_expired(&mut entries, now);
            if entries.len() >= self.capacity {
                // Population is best-effort; skipping keeps live entries.
                counter!("atelier_cache_full_skip_total").increment(1);
                tracing::debug!(key, capacity = self.capacity, "cache full; skipping populate");
                return Ok(());
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete");
        entries.remove(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_prefix.entries");
        let mut maps = rw_write(&self.maps, SOURCE, "delete_prefix.maps");
        entries.retain(|key, _| !key.starts_with(prefix));
        maps.retain(|name, _| !name.starts_with(prefix));
        Ok(())
    }

    fn hash_get(&self, map: &str, field: &str) -> Result<Option<i64>, CacheError> {
        let maps = rw_read(&self.maps, SOURCE, "hash_get");
        Ok(maps.get(map).and_then(|fields| fields.get(field)).copied())
    }

    fn hash_put(&self, map: &str, field: &str, value: i64) -> Result<(), CacheError> {
        let mut maps = rw_write(&self.maps, SOURCE, "hash_put");
        maps.entry(map.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "clear.entries");
        let mut maps = rw_write(&self.maps, SOURCE, "clear.maps");
        entries.clear();
        maps.clear();
        Ok(())
    }
}
