//! Airport persistence and the SQLite-backed spatial store.

use crate::spatial_store::{SpatialStore, StoreError, StoreResult};
use airhop_core::spatial::{bounding_box, haversine_distance};
use airhop_core::{Airport, AirportId, AirportWithDistance};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;

const UPSERT_AIRPORT_SQL: &str = r#"
    INSERT INTO airports (id, airport_name, city, country, iata_faa, icao, latitude, longitude, altitude, timezone, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
        airport_name = ?2, city = ?3, country = ?4, iata_faa = ?5, icao = ?6,
        latitude = ?7, longitude = ?8, altitude = ?9, timezone = ?10,
        updated_at = CURRENT_TIMESTAMP
"#;

const AIRPORT_COLUMNS: &str = "id, airport_name, city, country, iata_faa, icao, latitude, longitude, altitude, timezone";

/// Upsert an airport into the database.
pub async fn upsert_airport(pool: &SqlitePool, airport: &Airport) -> StoreResult<()> {
    sqlx::query(UPSERT_AIRPORT_SQL)
        .bind(airport.id)
        .bind(&airport.airport_name)
        .bind(&airport.city)
        .bind(&airport.country)
        .bind(&airport.iata_faa)
        .bind(&airport.icao)
        .bind(airport.latitude)
        .bind(airport.longitude)
        .bind(airport.altitude)
        .bind(&airport.timezone)
        .execute(pool)
        .await?;

    Ok(())
}

/// Upsert a batch of airports in one transaction.
pub async fn upsert_airports(pool: &SqlitePool, airports: &[Airport]) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for airport in airports {
        sqlx::query(UPSERT_AIRPORT_SQL)
            .bind(airport.id)
            .bind(&airport.airport_name)
            .bind(&airport.city)
            .bind(&airport.country)
            .bind(&airport.iata_faa)
            .bind(&airport.icao)
            .bind(airport.latitude)
            .bind(airport.longitude)
            .bind(airport.altitude)
            .bind(&airport.timezone)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn count_airports(pool: &SqlitePool) -> StoreResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM airports")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct AirportRow {
    id: i64,
    airport_name: String,
    city: String,
    country: String,
    iata_faa: Option<String>,
    icao: Option<String>,
    latitude: f64,
    longitude: f64,
    altitude: i64,
    timezone: String,
}

impl TryFrom<AirportRow> for Airport {
    type Error = StoreError;

    fn try_from(row: AirportRow) -> StoreResult<Self> {
        if !row.latitude.is_finite() || !row.longitude.is_finite() {
            return Err(StoreError::InvalidRow(format!(
                "airport {} has non-finite coordinates",
                row.id
            )));
        }
        Ok(Airport {
            id: row.id,
            airport_name: row.airport_name,
            city: row.city,
            country: row.country,
            iata_faa: row.iata_faa.filter(|s| !s.is_empty()),
            icao: row.icao.filter(|s| !s.is_empty()),
            latitude: row.latitude,
            longitude: row.longitude,
            altitude: row.altitude,
            timezone: row.timezone,
        })
    }
}

fn into_airports(rows: Vec<AirportRow>) -> StoreResult<Vec<Airport>> {
    rows.into_iter().map(Airport::try_from).collect()
}

/// SQLite has no geography type, so radius queries prefilter on a lat/lon
/// bounding box and finish with exact haversine distances.
#[derive(Clone)]
pub struct SqliteAirportStore {
    pool: SqlitePool,
}

impl SqliteAirportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_many(&self, ids: &[AirportId]) -> StoreResult<HashMap<AirportId, Airport>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE id IN ({placeholders})");
        let mut query = sqlx::query_as::<_, AirportRow>(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(into_airports(rows)?
            .into_iter()
            .map(|airport| (airport.id, airport))
            .collect())
    }
}

#[async_trait]
impl SpatialStore for SqliteAirportStore {
    async fn get_node(&self, id: AirportId) -> StoreResult<Option<Airport>> {
        let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE id = ?1");
        let row = sqlx::query_as::<_, AirportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Airport::try_from).transpose()
    }

    async fn find_within_radius(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<AirportWithDistance>> {
        let (min_lat, max_lat, min_lon, max_lon) = bounding_box(lat, lon, radius_km);
        let sql = format!(
            "SELECT {AIRPORT_COLUMNS} FROM airports \
             WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4"
        );
        let rows = sqlx::query_as::<_, AirportRow>(&sql)
            .bind(min_lat)
            .bind(max_lat)
            .bind(min_lon)
            .bind(max_lon)
            .fetch_all(&self.pool)
            .await?;

        let mut within: Vec<AirportWithDistance> = into_airports(rows)?
            .into_iter()
            .filter_map(|airport| {
                let distance = haversine_distance(lat, lon, airport.latitude, airport.longitude);
                (distance <= radius_km).then_some(AirportWithDistance { airport, distance })
            })
            .collect();

        within.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.airport.id.cmp(&b.airport.id))
        });
        if let Some(limit) = limit {
            within.truncate(limit);
        }
        Ok(within)
    }

    async fn get_distance(&self, a: AirportId, b: AirportId) -> StoreResult<Option<f64>> {
        let airports = self.fetch_many(&[a, b]).await?;
        Ok(match (airports.get(&a), airports.get(&b)) {
            (Some(from), Some(to)) => Some(from.distance_to(to)),
            _ => None,
        })
    }

    async fn get_distances(
        &self,
        pairs: &[(AirportId, AirportId)],
    ) -> StoreResult<HashMap<(AirportId, AirportId), f64>> {
        let mut ids: Vec<AirportId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        ids.sort_unstable();
        ids.dedup();
        let airports = self.fetch_many(&ids).await?;

        Ok(pairs
            .iter()
            .filter_map(|&(a, b)| {
                let from = airports.get(&a)?;
                let to = airports.get(&b)?;
                Some(((a, b), from.distance_to(to)))
            })
            .collect())
    }

    async fn find_by_country(&self, country: &str) -> StoreResult<Vec<Airport>> {
        let sql = format!(
            "SELECT {AIRPORT_COLUMNS} FROM airports \
             WHERE LOWER(country) = LOWER(?1) ORDER BY airport_name ASC"
        );
        let rows = sqlx::query_as::<_, AirportRow>(&sql)
            .bind(country)
            .fetch_all(&self.pool)
            .await?;
        into_airports(rows)
    }

    async fn find_all(&self) -> StoreResult<Vec<Airport>> {
        let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports ORDER BY id ASC");
        let rows = sqlx::query_as::<_, AirportRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_airports(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::init_database;

    fn airport(id: AirportId, lat: f64, lon: f64, country: &str) -> Airport {
        Airport {
            id,
            airport_name: format!("Airport {id}"),
            city: format!("City {id}"),
            country: country.to_string(),
            iata_faa: None,
            icao: None,
            latitude: lat,
            longitude: lon,
            altitude: 0,
            timezone: "0".to_string(),
        }
    }

    async fn seeded_store() -> SqliteAirportStore {
        let db = init_database(":memory:", 1).await.unwrap();
        let store = SqliteAirportStore::new(db.pool().clone());
        upsert_airports(
            store.pool(),
            &[
                airport(1, 0.0, 0.0, "Testland"),
                airport(2, 0.0, 1.0, "Testland"),
                airport(3, 0.0, 10.0, "Otherland"),
                airport(4, 0.5, 0.0, "testland"),
            ],
        )
        .await
        .unwrap();
        store
    }

    #[tokio::test]
    async fn get_node_round_trips_and_misses() {
        let store = seeded_store().await;
        let found = store.get_node(2).await.unwrap().expect("airport 2");
        assert_eq!(found.airport_name, "Airport 2");
        assert!(store.get_node(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn radius_results_are_sorted_and_limited() {
        let store = seeded_store().await;

        let all = store.find_within_radius(0.0, 0.0, 200.0, None).await.unwrap();
        let ids: Vec<AirportId> = all.iter().map(|a| a.airport.id).collect();
        assert_eq!(ids, vec![1, 4, 2]);
        assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(all[0].distance, 0.0);

        let limited = store.find_within_radius(0.0, 0.0, 200.0, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn radius_search_keeps_high_latitude_neighbors() {
        let db = init_database(":memory:", 1).await.unwrap();
        let store = SqliteAirportStore::new(db.pool().clone());
        upsert_airports(
            store.pool(),
            &[
                airport(1, 70.0, 0.0, "Northland"),
                airport(2, 71.3049, 21.5609, "Northland"),
            ],
        )
        .await
        .unwrap();

        let found = store.find_within_radius(70.0, 0.0, 804.672, None).await.unwrap();
        let ids: Vec<AirportId> = found.iter().map(|a| a.airport.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(found[1].distance <= 804.672);
    }

    #[tokio::test]
    async fn distances_skip_unknown_airports() {
        let store = seeded_store().await;
        let d = store.get_distance(1, 2).await.unwrap().unwrap();
        assert!((d - 111.19).abs() < 0.1);
        assert!(store.get_distance(1, 42).await.unwrap().is_none());

        let batch = store.get_distances(&[(1, 2), (2, 3), (1, 42)]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.contains_key(&(2, 3)));
        assert!(!batch.contains_key(&(1, 42)));
    }

    #[tokio::test]
    async fn country_lookup_is_case_insensitive() {
        let store = seeded_store().await;
        let found = store.find_by_country("TESTLAND").await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(count_airports(store.pool()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_rows() {
        let store = seeded_store().await;
        let mut moved = airport(3, 0.0, 1.5, "Otherland");
        moved.airport_name = "Renamed".to_string();
        upsert_airport(store.pool(), &moved).await.unwrap();

        let found = store.get_node(3).await.unwrap().unwrap();
        assert_eq!(found.airport_name, "Renamed");
        assert_eq!(found.longitude, 1.5);
        assert_eq!(count_airports(store.pool()).await.unwrap(), 4);
    }
}
