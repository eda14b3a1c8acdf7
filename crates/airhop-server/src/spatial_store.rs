//! Spatial store collaborator contract.
//!
//! The store is the authoritative, read-only source of airport reference
//! data. Everything the resolvers cache is recomputed from it on a miss.

use airhop_core::{Airport, AirportId, AirportWithDistance, RouteError};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored row: {0}")]
    InvalidRow(String),
}

impl From<StoreError> for RouteError {
    fn from(err: StoreError) -> Self {
        RouteError::Store(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SpatialStore: Send + Sync {
    async fn get_node(&self, id: AirportId) -> StoreResult<Option<Airport>>;

    /// Airports within `radius_km` of the point, ascending by distance,
    /// truncated to `limit` when given.
    async fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AirportWithDistance>>;

    /// Distance in km between two known airports; `None` if either is unknown.
    async fn get_distance(&self, a: AirportId, b: AirportId) -> StoreResult<Option<f64>>;

    /// Batched distances. Pairs referencing unknown airports are absent from
    /// the result. The default issues the single-pair lookups concurrently.
    async fn get_distances(
        &self,
        pairs: &[(AirportId, AirportId)],
    ) -> StoreResult<HashMap<(AirportId, AirportId), f64>> {
        let lookups = pairs.iter().map(|&(a, b)| async move {
            self.get_distance(a, b).await.map(|d| d.map(|d| ((a, b), d)))
        });
        let mut distances = HashMap::with_capacity(pairs.len());
        for found in join_all(lookups).await {
            if let Some((pair, distance)) = found? {
                distances.insert(pair, distance);
            }
        }
        Ok(distances)
    }

    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Airport>>;

    async fn find_all(&self) -> StoreResult<Vec<Airport>>;

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
