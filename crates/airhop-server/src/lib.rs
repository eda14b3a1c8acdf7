//! Airport lookup and hop-limited routing server.

pub mod api;
pub mod cache;
pub mod config;
pub mod ingest;
pub mod loops;
pub mod metrics;
pub mod persistence;
pub mod services;
pub mod spatial_store;
pub mod state;

#[cfg(test)]
mod test_support;
