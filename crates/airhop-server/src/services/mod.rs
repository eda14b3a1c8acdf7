//! Cache-aside services layered over the spatial store.

pub mod airports;
pub mod distances;
pub mod neighbors;
pub mod routes;

pub use airports::{AirportService, AirportTtls};
pub use distances::DistanceResolver;
pub use neighbors::NeighborResolver;
pub use routes::{RouteService, RouteSettings};
