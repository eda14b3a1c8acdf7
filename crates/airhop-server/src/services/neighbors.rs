//! Cache-aside neighbor lists: every airport within one hop of an origin.

use std::sync::Arc;

use airhop_core::{keys, AirportId, CacheNamespace, Neighbor};

use crate::cache::{get_json, set_json, CacheStore};
use crate::metrics::CacheMetrics;
use crate::spatial_store::{SpatialStore, StoreResult};

#[derive(Clone)]
pub struct NeighborResolver {
    store: Arc<dyn SpatialStore>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<CacheMetrics>,
    ceiling_km: f64,
    max_neighbors: usize,
    ttl_s: u64,
}

impl NeighborResolver {
    pub fn new(
        store: Arc<dyn SpatialStore>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<CacheMetrics>,
        ceiling_km: f64,
        max_neighbors: usize,
        ttl_s: u64,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
            ceiling_km,
            max_neighbors,
            ttl_s,
        }
    }

    pub fn ceiling_km(&self) -> f64 {
        self.ceiling_km
    }

    /// Cached neighbor list if present, without touching the store.
    pub async fn cached(&self, id: AirportId) -> Option<Vec<Neighbor>> {
        get_json(self.cache.as_ref(), &keys::neighbors(id)).await
    }

    /// Airports within the hop ceiling of `id`, ascending by distance,
    /// excluding `id` itself and capped at `max_neighbors`.
    ///
    /// An unknown origin contributes no edges, so it resolves to an empty
    /// list rather than an error. Empty lists for unknown ids are not cached.
    pub async fn neighbors(&self, id: AirportId) -> StoreResult<Vec<Neighbor>> {
        let cached = self.cached(id).await;
        self.metrics.record(CacheNamespace::Neighbors, &cached);
        if let Some(neighbors) = cached {
            tracing::debug!("Neighbor cache hit for airport {}", id);
            return Ok(neighbors);
        }
        tracing::debug!("Neighbor cache miss for airport {}", id);

        let Some(origin) = self.store.get_node(id).await? else {
            return Ok(Vec::new());
        };

        // One extra row because the origin itself is always within radius.
        let in_radius = self
            .store
            .find_within_radius(
                origin.latitude,
                origin.longitude,
                self.ceiling_km,
                Some(self.max_neighbors.saturating_add(1)),
            )
            .await?;

        let neighbors: Vec<Neighbor> = in_radius
            .into_iter()
            .filter(|candidate| candidate.airport.id != id)
            .map(|candidate| Neighbor {
                id: candidate.airport.id,
                distance: candidate.distance,
            })
            .take(self.max_neighbors)
            .collect();

        set_json(self.cache.as_ref(), &keys::neighbors(id), &neighbors, self.ttl_s).await;
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::test_support::{airport, FakeStore, UnavailableCache};

    fn resolver(store: Arc<FakeStore>, cache: Arc<dyn CacheStore>, max: usize) -> NeighborResolver {
        NeighborResolver::new(store, cache, Arc::new(CacheMetrics::new()), 200.0, max, 60)
    }

    fn cluster() -> Arc<FakeStore> {
        Arc::new(FakeStore::new(vec![
            airport(1, 0.0, 0.0),
            airport(2, 0.0, 1.0),
            airport(3, 0.0, 0.5),
            airport(4, 0.5, 0.0),
            airport(5, 0.0, 10.0),
        ]))
    }

    #[tokio::test]
    async fn excludes_origin_and_sorts_by_distance() {
        let store = cluster();
        let neighbors = resolver(store, Arc::new(MemoryCache::new(100)), 10)
            .neighbors(1)
            .await
            .unwrap();

        let ids: Vec<AirportId> = neighbors.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&5));
        assert_eq!(ids[2], 2);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn caps_list_length() {
        let store = cluster();
        let neighbors = resolver(store, Arc::new(MemoryCache::new(100)), 2)
            .neighbors(1)
            .await
            .unwrap();
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.iter().all(|n| n.id != 1));
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let store = cluster();
        let resolver = resolver(store.clone(), Arc::new(MemoryCache::new(100)), 10);

        let first = resolver.neighbors(1).await.unwrap();
        let calls_after_first = store.calls();
        let second = resolver.neighbors(1).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.calls(), calls_after_first);
        let stats = resolver.metrics.stats(CacheNamespace::Neighbors);
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn unbounded_cap_returns_every_neighbor() {
        let store = cluster();
        let neighbors = resolver(store, Arc::new(MemoryCache::new(100)), usize::MAX)
            .neighbors(1)
            .await
            .unwrap();
        assert_eq!(neighbors.len(), 3);
    }

    #[tokio::test]
    async fn unknown_origin_has_no_neighbors() {
        let store = cluster();
        let neighbors = resolver(store, Arc::new(MemoryCache::new(100)), 10)
            .neighbors(404)
            .await
            .unwrap();
        assert!(neighbors.is_empty());
    }

    #[tokio::test]
    async fn unavailable_cache_falls_back_to_store() {
        let store = cluster();
        let resolver = resolver(store.clone(), Arc::new(UnavailableCache), 10);

        let first = resolver.neighbors(1).await.unwrap();
        let second = resolver.neighbors(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(store.calls() >= 4);
    }
}
