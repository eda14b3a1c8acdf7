//! Load the airport catalog from CSV into the SQLite database.
//!
//! Usage: `ingest_airports [CSV_PATH]`. The path defaults to
//! `AIRHOP_AIRPORTS_CSV`, then `data/airports.csv`. The target database is
//! `AIRHOP_DATABASE_PATH`, as for the server.

use anyhow::{Context, Result};
use std::fs::File;

use airhop_server::config::Config;
use airhop_server::ingest::{ingest_airports, read_airports, INGEST_BATCH_SIZE};
use airhop_server::persistence::{airports::count_airports, init_database};

const DEFAULT_CSV_PATH: &str = "data/airports.csv";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airhop_server=info".parse()?)
                .add_directive("ingest_airports=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    let csv_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("AIRHOP_AIRPORTS_CSV").ok())
        .unwrap_or_else(|| DEFAULT_CSV_PATH.to_string());

    tracing::info!("Initializing database at {}", config.database_path);
    let db = init_database(&config.database_path, config.database_max_connections).await?;

    let file = File::open(&csv_path).with_context(|| format!("opening {}", csv_path))?;
    let parsed = read_airports(file)?;
    tracing::info!(
        "Parsed {} records ({} skipped). Inserting in batches of {}",
        parsed.airports.len(),
        parsed.skipped,
        INGEST_BATCH_SIZE
    );

    ingest_airports(db.pool(), &parsed.airports).await?;

    let total = count_airports(db.pool()).await?;
    tracing::info!("Ingestion complete. Total airports in database: {}", total);
    Ok(())
}
