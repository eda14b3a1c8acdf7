//! Key-value cache substrate.
//!
//! Every value the resolvers write is a deterministic function of immutable
//! store data, so concurrent writers racing on one key all write the same
//! bytes and last-write-wins needs no locking. Implementations never surface
//! errors: an unavailable cache reads as a miss and drops writes.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;

    fn is_expired(&self, now: Instant) -> bool;
}

/// Drop expired entries, then the oldest entries until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize) -> usize
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let before = cache.len();
    cache.retain(|_, entry| !entry.is_expired(now));

    if cache.len() > max_entries {
        let mut entries: Vec<(K, Instant)> = cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
            .collect();
        entries.sort_by_key(|(_, fetched_at)| *fetched_at);
        for (key, _) in entries {
            if cache.len() <= max_entries {
                break;
            }
            cache.remove(&key);
        }
    }

    before.saturating_sub(cache.len())
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    fetched_at: Instant,
    ttl: Duration,
    value: Vec<u8>,
}

impl CacheEntry for MemoryEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) >= self.ttl
    }
}

/// In-process TTL cache. Expired entries read as misses and are reclaimed by
/// [`MemoryCache::prune`].
pub struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn prune(&self) -> usize {
        prune_cache(&self.entries, self.max_entries)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                fetched_at: Instant::now(),
                ttl,
                value,
            },
        );
    }
}

/// Read a JSON value. Undecodable payloads count as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = cache.get(key).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("Discarding undecodable cache entry {}: {}", key, err);
            None
        }
    }
}

pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl_s: u64,
) {
    match serde_json::to_vec(value) {
        Ok(bytes) => cache.set_with_ttl(key, bytes, Duration::from_secs(ttl_s)).await,
        Err(err) => tracing::warn!("Skipping cache write for {}: {}", key, err),
    }
}
