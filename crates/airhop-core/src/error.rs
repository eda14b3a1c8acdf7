//! Route resolution errors.

use crate::models::AirportId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// Referenced airport id does not exist in the store.
    #[error("airport with id {0} not found")]
    UnknownNode(AirportId),

    /// Frontier exhausted or visitation bound reached.
    #[error("no route found between airports {from} and {to}")]
    NoPath { from: AirportId, to: AirportId },

    /// A path edge whose distance could not be resolved afterwards.
    #[error("distance between airports {from} and {to} could not be resolved for a found path")]
    Inconsistency { from: AirportId, to: AirportId },

    #[error("route search exceeded {0} ms")]
    Timeout(u64),

    #[error("spatial store error: {0}")]
    Store(String),
}
