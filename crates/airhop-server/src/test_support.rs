//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use airhop_core::spatial::haversine_distance;
use airhop_core::{Airport, AirportId, AirportWithDistance};
use async_trait::async_trait;

use crate::cache::CacheStore;
use crate::spatial_store::{SpatialStore, StoreResult};

pub fn airport(id: AirportId, lat: f64, lon: f64) -> Airport {
    Airport {
        id,
        airport_name: format!("Airport {id}"),
        city: format!("City {id}"),
        country: "Testland".to_string(),
        iata_faa: None,
        icao: None,
        latitude: lat,
        longitude: lon,
        altitude: 0,
        timezone: "0".to_string(),
    }
}

/// Spatial store over a fixed airport list that counts every call.
pub struct FakeStore {
    airports: HashMap<AirportId, Airport>,
    calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(airports: Vec<Airport>) -> Self {
        Self {
            airports: airports.into_iter().map(|a| (a.id, a)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpatialStore for FakeStore {
    async fn get_node(&self, id: AirportId) -> StoreResult<Option<Airport>> {
        self.touch();
        Ok(self.airports.get(&id).cloned())
    }

    async fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AirportWithDistance>> {
        self.touch();
        let mut found: Vec<AirportWithDistance> = self
            .airports
            .values()
            .map(|a| AirportWithDistance {
                airport: a.clone(),
                distance: haversine_distance(lat, lon, a.latitude, a.longitude),
            })
            .filter(|a| a.distance <= radius_km)
            .collect();
        found.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.airport.id.cmp(&b.airport.id))
        });
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn get_distance(&self, a: AirportId, b: AirportId) -> StoreResult<Option<f64>> {
        self.touch();
        Ok(match (self.airports.get(&a), self.airports.get(&b)) {
            (Some(from), Some(to)) => Some(from.distance_to(to)),
            _ => None,
        })
    }

    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Airport>> {
        self.touch();
        let mut found: Vec<Airport> = self
            .airports
            .values()
            .filter(|a| a.country.eq_ignore_ascii_case(country))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.airport_name.cmp(&b.airport_name));
        Ok(found)
    }

    async fn find_all(&self) -> StoreResult<Vec<Airport>> {
        self.touch();
        let mut all: Vec<Airport> = self.airports.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }
}

/// Cache substrate that is permanently down: every read misses, writes vanish.
pub struct UnavailableCache;

#[async_trait]
impl CacheStore for UnavailableCache {
    async fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) {}
}
