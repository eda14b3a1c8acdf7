//! Application state: the spatial store, the shared cache, and the services
//! wired over them.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::{CacheStore, MemoryCache};
use crate::config::Config;
use crate::metrics::CacheMetrics;
use crate::services::{
    AirportService, AirportTtls, DistanceResolver, NeighborResolver, RouteService, RouteSettings,
};
use crate::spatial_store::SpatialStore;

pub struct AppState {
    store: Arc<dyn SpatialStore>,
    cache: Arc<MemoryCache>,
    metrics: Arc<CacheMetrics>,
    airports: AirportService,
    neighbors: NeighborResolver,
    routes: RouteService,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn SpatialStore>) -> Self {
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        let shared_cache: Arc<dyn CacheStore> = cache.clone();
        let metrics = Arc::new(CacheMetrics::new());

        let distances = DistanceResolver::new(
            store.clone(),
            shared_cache.clone(),
            metrics.clone(),
            config.distance_ttl_s,
        );
        let neighbors = NeighborResolver::new(
            store.clone(),
            shared_cache.clone(),
            metrics.clone(),
            config.max_leg_km,
            config.max_neighbors,
            config.neighbor_ttl_s,
        );
        let airports = AirportService::new(
            store.clone(),
            shared_cache.clone(),
            metrics.clone(),
            distances.clone(),
            AirportTtls::from(config),
        );
        let routes = RouteService::new(
            airports.clone(),
            neighbors.clone(),
            distances,
            shared_cache,
            metrics.clone(),
            RouteSettings {
                max_visited: config.max_visited,
                ttl_s: config.route_ttl_s,
                timeout: config.route_timeout(),
            },
        );

        Self {
            store,
            cache,
            metrics,
            airports,
            neighbors,
            routes,
            started_at: Utc::now(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SpatialStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<MemoryCache> {
        &self.cache
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn airports(&self) -> &AirportService {
        &self.airports
    }

    pub fn neighbors(&self) -> &NeighborResolver {
        &self.neighbors
    }

    pub fn routes(&self) -> &RouteService {
        &self.routes
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
