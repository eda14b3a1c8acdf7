//! Server configuration from environment.

use airhop_core::miles_to_kilometers;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MAX_LEG_MILES: f64 = 500.0;
const NEIGHBOR_TTL_DEFAULT_S: u64 = 86_400 * 30;
/// Upper bound on neighbor list length, which also bounds each cached entry.
const MAX_NEIGHBORS_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Longest single hop a route may contain, in kilometers
    pub max_leg_km: f64,
    /// Cap on cached neighbor list length
    pub max_neighbors: usize,
    pub max_visited: usize,
    pub route_timeout_ms: u64,
    pub airport_ttl_s: u64,
    pub radius_ttl_s: u64,
    pub neighbor_ttl_s: u64,
    pub distance_ttl_s: u64,
    pub route_ttl_s: u64,
    pub country_ttl_s: u64,
    pub cache_max_entries: usize,
    pub cache_prune_interval_s: u64,
    pub warm_neighbor_cache: bool,
    pub warm_batch_size: usize,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_path: "data/airports.db".to_string(),
            database_max_connections: 5,
            max_leg_km: miles_to_kilometers(DEFAULT_MAX_LEG_MILES),
            max_neighbors: 200,
            max_visited: airhop_core::routing::DEFAULT_MAX_VISITED,
            route_timeout_ms: 5_000,
            airport_ttl_s: 3_600,
            radius_ttl_s: 1_800,
            neighbor_ttl_s: NEIGHBOR_TTL_DEFAULT_S,
            distance_ttl_s: 3_600,
            route_ttl_s: 3_600,
            country_ttl_s: 3_600,
            cache_max_entries: 200_000,
            cache_prune_interval_s: 60,
            warm_neighbor_cache: false,
            warm_batch_size: 50,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("AIRHOP_PORT", defaults.server_port),
            database_path: env::var("AIRHOP_DATABASE_PATH").unwrap_or(defaults.database_path),
            database_max_connections: env_parse(
                "AIRHOP_DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )
            .max(1),
            max_leg_km: env::var("AIRHOP_MAX_LEG_MILES")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|miles| miles.is_finite() && *miles > 0.0)
                .map(miles_to_kilometers)
                .unwrap_or(defaults.max_leg_km),
            max_neighbors: env_parse("AIRHOP_MAX_NEIGHBORS", defaults.max_neighbors)
                .clamp(1, MAX_NEIGHBORS_LIMIT),
            max_visited: env_parse("AIRHOP_MAX_VISITED", defaults.max_visited),
            route_timeout_ms: env_parse("AIRHOP_ROUTE_TIMEOUT_MS", defaults.route_timeout_ms),
            airport_ttl_s: env_parse("AIRHOP_AIRPORT_TTL_S", defaults.airport_ttl_s),
            radius_ttl_s: env_parse("AIRHOP_RADIUS_TTL_S", defaults.radius_ttl_s),
            neighbor_ttl_s: env_parse("AIRHOP_NEIGHBOR_TTL_S", defaults.neighbor_ttl_s),
            distance_ttl_s: env_parse("AIRHOP_DISTANCE_TTL_S", defaults.distance_ttl_s),
            route_ttl_s: env_parse("AIRHOP_ROUTE_TTL_S", defaults.route_ttl_s),
            country_ttl_s: env_parse("AIRHOP_COUNTRY_TTL_S", defaults.country_ttl_s),
            cache_max_entries: env_parse("AIRHOP_CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_prune_interval_s: env_parse(
                "AIRHOP_CACHE_PRUNE_INTERVAL_S",
                defaults.cache_prune_interval_s,
            )
            .max(1),
            warm_neighbor_cache: env::var("AIRHOP_WARM_NEIGHBOR_CACHE")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.warm_neighbor_cache),
            warm_batch_size: env_parse("AIRHOP_WARM_BATCH_SIZE", defaults.warm_batch_size).max(1),
            log_json: env::var("AIRHOP_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),
        }
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms.max(1))
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
