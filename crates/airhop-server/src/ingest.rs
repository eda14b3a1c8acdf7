//! CSV ingestion of the airport catalog.
//!
//! Expected header: `ID, Airport Name, City, Country, IATA/FAA, ICAO,
//! Latitude, Longitude, Altitude, Timezone`. Blank IATA/FAA or ICAO codes
//! are stored as NULL.

use std::io::Read;

use airhop_core::{Airport, AirportId};
use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::persistence::airports::upsert_airports;

pub const INGEST_BATCH_SIZE: usize = 100;
const PROGRESS_EVERY: usize = 1_000;

#[derive(Debug, Deserialize)]
struct CsvAirportRow {
    #[serde(rename = "ID")]
    id: AirportId,
    #[serde(rename = "Airport Name")]
    airport_name: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "IATA/FAA")]
    iata_faa: String,
    #[serde(rename = "ICAO")]
    icao: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Altitude")]
    altitude: i64,
    #[serde(rename = "Timezone")]
    timezone: String,
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<CsvAirportRow> for Airport {
    fn from(row: CsvAirportRow) -> Self {
        Airport {
            id: row.id,
            airport_name: row.airport_name,
            city: row.city,
            country: row.country,
            iata_faa: non_blank(row.iata_faa),
            icao: non_blank(row.icao),
            latitude: row.latitude,
            longitude: row.longitude,
            altitude: row.altitude,
            timezone: row.timezone,
        }
    }
}

#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub airports: Vec<Airport>,
    /// Rows that failed to parse or had out-of-range coordinates
    pub skipped: usize,
}

/// Parse airport rows from CSV. Malformed rows are logged and skipped.
pub fn read_airports<R: Read>(reader: R) -> Result<ParsedCatalog> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedCatalog::default();
    for (line, record) in csv.deserialize::<CsvAirportRow>().enumerate() {
        match record {
            Ok(row) if valid_coordinates(row.latitude, row.longitude) => {
                parsed.airports.push(row.into());
            }
            Ok(row) => {
                tracing::warn!("Skipping airport {}: coordinates out of range", row.id);
                parsed.skipped += 1;
            }
            Err(err) => {
                tracing::warn!("Skipping CSV record {}: {}", line + 1, err);
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Upsert airports in batches, logging progress. Returns rows written.
pub async fn ingest_airports(pool: &SqlitePool, airports: &[Airport]) -> Result<usize> {
    let mut written = 0;
    for batch in airports.chunks(INGEST_BATCH_SIZE) {
        upsert_airports(pool, batch)
            .await
            .with_context(|| format!("upserting airports starting at id {}", batch[0].id))?;
        let before = written;
        written += batch.len();
        if written / PROGRESS_EVERY > before / PROGRESS_EVERY || written == airports.len() {
            tracing::info!("Inserted {}/{} records", written, airports.len());
        }
    }
    Ok(written)
}
