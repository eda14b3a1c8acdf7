//! Cache-aside pairwise distances, resolved individually or in batches.

use std::collections::HashMap;
use std::sync::Arc;

use airhop_core::{keys, AirportId, CacheNamespace};
use futures::future::join_all;

use crate::cache::{get_json, set_json, CacheStore};
use crate::metrics::CacheMetrics;
use crate::spatial_store::{SpatialStore, StoreResult};

#[derive(Clone)]
pub struct DistanceResolver {
    store: Arc<dyn SpatialStore>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<CacheMetrics>,
    ttl_s: u64,
}

impl DistanceResolver {
    pub fn new(
        store: Arc<dyn SpatialStore>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<CacheMetrics>,
        ttl_s: u64,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
            ttl_s,
        }
    }

    /// Distance in km between two airports; `None` when either id is unknown.
    pub async fn distance(&self, a: AirportId, b: AirportId) -> StoreResult<Option<f64>> {
        Ok(self.distances(&[(a, b)]).await?.get(&(a, b)).copied())
    }

    /// Distances for every requested pair whose airports both exist. Pairs
    /// referencing unknown airports are absent from the map.
    ///
    /// Cache reads fan out concurrently; all misses go to the store in one
    /// batched call and are written back under the sorted-pair key.
    pub async fn distances(
        &self,
        pairs: &[(AirportId, AirportId)],
    ) -> StoreResult<HashMap<(AirportId, AirportId), f64>> {
        let lookups = pairs.iter().map(|&(a, b)| async move {
            let cached: Option<f64> = get_json(self.cache.as_ref(), &keys::distance(a, b)).await;
            ((a, b), cached)
        });

        let mut resolved = HashMap::with_capacity(pairs.len());
        let mut missing = Vec::new();
        for (pair, cached) in join_all(lookups).await {
            self.metrics.record(CacheNamespace::Distance, &cached);
            match cached {
                Some(distance) => {
                    resolved.insert(pair, distance);
                }
                None => missing.push(pair),
            }
        }

        if missing.is_empty() {
            return Ok(resolved);
        }

        missing.sort_unstable();
        missing.dedup();
        tracing::debug!("Resolving {} uncached distances from store", missing.len());
        let fetched = self.store.get_distances(&missing).await?;

        let writes = fetched.iter().map(|(&(a, b), distance)| async move {
            set_json(self.cache.as_ref(), &keys::distance(a, b), distance, self.ttl_s).await
        });
        join_all(writes).await;

        resolved.extend(fetched);
        Ok(resolved)
    }
}
