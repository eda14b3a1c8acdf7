//! Route finding: hop-limited path search over cached neighbor lists,
//! assembled into legs with batched distance and airport lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use airhop_core::{
    build_legs, find_shortest_path, keys, path_pairs, AirportId, AirportSummary, CacheNamespace,
    RouteError, RouteResponse, SearchConfig,
};
use futures::future::join_all;

use crate::cache::{get_json, set_json, CacheStore};
use crate::metrics::CacheMetrics;
use crate::services::airports::AirportService;
use crate::services::distances::DistanceResolver;
use crate::services::neighbors::NeighborResolver;

#[derive(Debug, Clone, Copy)]
pub struct RouteSettings {
    pub max_visited: usize,
    pub ttl_s: u64,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct RouteService {
    airports: AirportService,
    neighbors: NeighborResolver,
    distances: DistanceResolver,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<CacheMetrics>,
    settings: RouteSettings,
}

impl RouteService {
    pub fn new(
        airports: AirportService,
        neighbors: NeighborResolver,
        distances: DistanceResolver,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<CacheMetrics>,
        settings: RouteSettings,
    ) -> Self {
        Self {
            airports,
            neighbors,
            distances,
            cache,
            metrics,
            settings,
        }
    }

    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            ceiling_km: self.neighbors.ceiling_km(),
            max_visited: self.settings.max_visited,
        }
    }

    /// Fewest-hop route from `from` to `to` where no leg exceeds the hop
    /// ceiling. Both endpoints must exist. The whole search, including every
    /// neighbor lookup, runs under the configured wall-clock timeout.
    pub async fn find_route(
        &self,
        from: AirportId,
        to: AirportId,
    ) -> Result<RouteResponse, RouteError> {
        let (origin, destination) = tokio::try_join!(
            self.airports.find_by_id(from),
            self.airports.find_by_id(to)
        )?;
        if origin.is_none() {
            return Err(RouteError::UnknownNode(from));
        }
        if destination.is_none() {
            return Err(RouteError::UnknownNode(to));
        }
        if from == to {
            return Ok(RouteResponse::empty());
        }

        let key = keys::route(from, to);
        let cached: Option<RouteResponse> = get_json(self.cache.as_ref(), &key).await;
        self.metrics.record(CacheNamespace::Route, &cached);
        if let Some(route) = cached {
            tracing::debug!("Route cache hit for {} -> {}", from, to);
            return Ok(route.oriented_from(from));
        }

        let started = Instant::now();
        let config = self.search_config();
        let search = find_shortest_path(from, to, config, |id| self.neighbors.neighbors(id));
        let result = tokio::time::timeout(self.settings.timeout, search)
            .await
            .map_err(|_| {
                tracing::warn!(
                    "Route search {} -> {} timed out after {:?}",
                    from,
                    to,
                    self.settings.timeout
                );
                RouteError::Timeout(self.settings.timeout.as_millis() as u64)
            })??;

        if !result.found() {
            if result.bound_reached {
                tracing::info!(
                    "Route search {} -> {} gave up after visiting {} airports",
                    from,
                    to,
                    result.nodes_visited
                );
            }
            return Err(RouteError::NoPath { from, to });
        }

        tracing::debug!(
            "Route {} -> {}: {} hops, {} expanded, {:?}",
            from,
            to,
            result.hops(),
            result.nodes_expanded,
            started.elapsed()
        );

        let route = self.assemble(&result.path).await?;
        set_json(self.cache.as_ref(), &key, &route, self.settings.ttl_s).await;
        Ok(route)
    }

    /// Legs for `path` in order. A single-airport path is an empty route.
    pub async fn assemble(&self, path: &[AirportId]) -> Result<RouteResponse, RouteError> {
        if path.len() < 2 {
            return Ok(RouteResponse::empty());
        }

        let pairs = path_pairs(path);
        let lookups = path.iter().map(|&id| self.airports.find_by_id(id));
        let (distances, airports) =
            tokio::join!(self.distances.distances(&pairs), join_all(lookups));
        let distances = distances?;

        let mut summaries: HashMap<AirportId, AirportSummary> = HashMap::with_capacity(path.len());
        for airport in airports {
            if let Some(airport) = airport? {
                summaries.insert(airport.id, airport.summary());
            }
        }

        let legs = build_legs(
            path,
            |from, to| distances.get(&(from, to)).copied(),
            |id| summaries.get(&id).cloned(),
        )?;
        Ok(RouteResponse::from_legs(legs))
    }
}
