//! Persistence layer for the airport catalog.
//!
//! SQLite-backed storage for airport reference data. The catalog is
//! written by ingestion and only read while serving.

pub mod airports;
pub mod db;

pub use airports::SqliteAirportStore;
pub use db::{init_database, Database};
