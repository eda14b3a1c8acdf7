//! Core logic for the airhop airport service: great-circle math, cache key
//! derivation, hop-limited breadth-first route search and leg assembly.

pub mod error;
pub mod keys;
pub mod models;
pub mod routing;
pub mod spatial;

pub use error::RouteError;
pub use keys::CacheNamespace;
pub use models::{
    Airport, AirportId, AirportSummary, AirportWithDistance, CountryComparison, Neighbor,
    RouteLeg, RouteResponse,
};
pub use routing::{build_legs, find_shortest_path, path_pairs, PathSearchResult, SearchConfig};
pub use spatial::{haversine_distance, kilometers_to_miles, miles_to_kilometers};
