//! Cached airport lookups: by id, by radius, by country, and the closest
//! airport pair between two countries.

use std::sync::Arc;

use airhop_core::{
    keys, Airport, AirportId, AirportWithDistance, CacheNamespace, CountryComparison,
};

use crate::cache::{get_json, set_json, CacheStore};
use crate::config::Config;
use crate::metrics::CacheMetrics;
use crate::services::distances::DistanceResolver;
use crate::spatial_store::{SpatialStore, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct AirportTtls {
    pub airport_s: u64,
    pub radius_s: u64,
    pub country_s: u64,
}

impl From<&Config> for AirportTtls {
    fn from(config: &Config) -> Self {
        Self {
            airport_s: config.airport_ttl_s,
            radius_s: config.radius_ttl_s,
            country_s: config.country_ttl_s,
        }
    }
}

#[derive(Clone)]
pub struct AirportService {
    store: Arc<dyn SpatialStore>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<CacheMetrics>,
    distances: DistanceResolver,
    ttls: AirportTtls,
}

impl AirportService {
    pub fn new(
        store: Arc<dyn SpatialStore>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<CacheMetrics>,
        distances: DistanceResolver,
        ttls: AirportTtls,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
            distances,
            ttls,
        }
    }

    pub async fn find_by_id(&self, id: AirportId) -> StoreResult<Option<Airport>> {
        let key = keys::airport(id);
        let cached: Option<Airport> = get_json(self.cache.as_ref(), &key).await;
        self.metrics.record(CacheNamespace::Airport, &cached);
        if cached.is_some() {
            return Ok(cached);
        }

        let airport = self.store.get_node(id).await?;
        if let Some(airport) = &airport {
            set_json(self.cache.as_ref(), &key, airport, self.ttls.airport_s).await;
        }
        Ok(airport)
    }

    /// Radius search keyed on the raw coordinates, so float jitter in the
    /// query produces separate entries.
    pub async fn find_by_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> StoreResult<Vec<AirportWithDistance>> {
        let key = keys::airports_in_radius(lat, lon, radius_km);
        let cached: Option<Vec<AirportWithDistance>> = get_json(self.cache.as_ref(), &key).await;
        self.metrics.record(CacheNamespace::Radius, &cached);
        if let Some(airports) = cached {
            return Ok(airports);
        }

        let airports = self
            .store
            .find_within_radius(lat, lon, radius_km, None)
            .await?;
        set_json(self.cache.as_ref(), &key, &airports, self.ttls.radius_s).await;
        Ok(airports)
    }

    pub async fn find_distance(&self, a: AirportId, b: AirportId) -> StoreResult<Option<f64>> {
        self.distances.distance(a, b).await
    }

    pub async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Airport>> {
        let key = keys::airports_by_country(country);
        let cached: Option<Vec<Airport>> = get_json(self.cache.as_ref(), &key).await;
        self.metrics.record(CacheNamespace::Country, &cached);
        if let Some(airports) = cached {
            return Ok(airports);
        }

        let airports = self.store.find_by_country(country).await?;
        set_json(self.cache.as_ref(), &key, &airports, self.ttls.country_s).await;
        Ok(airports)
    }

    pub async fn find_all(&self) -> StoreResult<Vec<Airport>> {
        self.store.find_all().await
    }

    /// Closest airport pair with one airport in each country. `None` when
    /// either country has no airports.
    pub async fn find_country_comparison(
        &self,
        country1: &str,
        country2: &str,
    ) -> StoreResult<Option<CountryComparison>> {
        let key = keys::country_comparison(country1, country2);
        let cached: Option<CountryComparison> = get_json(self.cache.as_ref(), &key).await;
        self.metrics.record(CacheNamespace::Country, &cached);
        if let Some(comparison) = cached {
            return Ok(Some(orient_comparison(comparison, country1)));
        }

        let (first, second) = tokio::try_join!(
            self.find_by_country(country1),
            self.find_by_country(country2)
        )?;
        let Some(comparison) = closest_pair(&first, &second) else {
            return Ok(None);
        };

        set_json(self.cache.as_ref(), &key, &comparison, self.ttls.country_s).await;
        Ok(Some(comparison))
    }
}

fn closest_pair(first: &[Airport], second: &[Airport]) -> Option<CountryComparison> {
    let mut best: Option<(f64, &Airport, &Airport)> = None;
    for a in first {
        for b in second {
            if a.id == b.id {
                continue;
            }
            let distance = a.distance_to(b);
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, a, b));
            }
        }
    }
    best.map(|(distance, a, b)| CountryComparison {
        airport1: a.clone(),
        airport2: b.clone(),
        distance,
    })
}

/// Cached comparisons are shared by both argument orders; put the airport
/// from `country1` first.
fn orient_comparison(comparison: CountryComparison, country1: &str) -> CountryComparison {
    if comparison.airport1.country.to_lowercase() == country1.to_lowercase() {
        return comparison;
    }
    CountryComparison {
        airport1: comparison.airport2,
        airport2: comparison.airport1,
        distance: comparison.distance,
    }
}
