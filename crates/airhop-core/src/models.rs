//! Core data models for airport lookups and routes.

use serde::{Deserialize, Serialize};

/// Store identifier of an airport.
pub type AirportId = i64;

/// Airport reference data. Provisioned by ingestion, never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub id: AirportId,
    pub airport_name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub iata_faa: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i64,
    pub timezone: String,
}

impl Airport {
    pub fn summary(&self) -> AirportSummary {
        AirportSummary {
            id: self.id,
            name: self.airport_name.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
        }
    }

    /// Great-circle distance to another airport in kilometers.
    pub fn distance_to(&self, other: &Airport) -> f64 {
        crate::spatial::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Airport plus its distance (km) from a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportWithDistance {
    #[serde(flatten)]
    pub airport: Airport,
    pub distance: f64,
}

/// Closest pair of airports between two countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryComparison {
    pub airport1: Airport,
    pub airport2: Airport,
    pub distance: f64,
}

/// One airport reachable in a single hop from some origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: AirportId,
    pub distance: f64,
}

/// Descriptive subset of an airport embedded in route legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportSummary {
    pub id: AirportId,
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from_id: AirportId,
    pub to_id: AirportId,
    pub from_node: AirportSummary,
    pub to_node: AirportSummary,
    /// Leg length in kilometers
    pub distance: f64,
}

impl RouteLeg {
    /// The same leg travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            from_id: self.to_id,
            to_id: self.from_id,
            from_node: self.to_node.clone(),
            to_node: self.from_node.clone(),
            distance: self.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub legs: Vec<RouteLeg>,
    pub total_distance: f64,
    pub total_stops: usize,
}

impl RouteResponse {
    /// Route with no legs, returned when start and end coincide.
    pub fn empty() -> Self {
        Self {
            legs: Vec::new(),
            total_distance: 0.0,
            total_stops: 0,
        }
    }

    /// Build a route from legs, deriving the totals.
    pub fn from_legs(legs: Vec<RouteLeg>) -> Self {
        let total_distance = legs.iter().map(|leg| leg.distance).sum();
        let total_stops = legs.len().saturating_sub(1);
        Self {
            legs,
            total_distance,
            total_stops,
        }
    }

    pub fn origin(&self) -> Option<AirportId> {
        self.legs.first().map(|leg| leg.from_id)
    }

    /// Same undirected path travelled end to start.
    pub fn reversed(&self) -> Self {
        Self {
            legs: self.legs.iter().rev().map(RouteLeg::reversed).collect(),
            total_distance: self.total_distance,
            total_stops: self.total_stops,
        }
    }

    /// Orient the route so it departs from `from`. Routes already departing
    /// from `from` (or empty routes) are returned unchanged.
    pub fn oriented_from(self, from: AirportId) -> Self {
        match self.origin() {
            Some(origin) if origin != from => self.reversed(),
            _ => self,
        }
    }
}
