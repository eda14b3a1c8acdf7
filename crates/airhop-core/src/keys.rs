//! Cache key derivation.
//!
//! Keys for symmetric relations (distance, route, country comparison) sort
//! their operands first so both query directions share one entry. Radius keys
//! embed the query coordinates verbatim, so two float spellings of the "same"
//! point produce distinct entries.

use crate::models::AirportId;

/// Logical cache namespaces, used for hit/miss accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Airport,
    Radius,
    Neighbors,
    Distance,
    Route,
    Country,
}

impl CacheNamespace {
    pub const ALL: [CacheNamespace; 6] = [
        CacheNamespace::Airport,
        CacheNamespace::Radius,
        CacheNamespace::Neighbors,
        CacheNamespace::Distance,
        CacheNamespace::Route,
        CacheNamespace::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheNamespace::Airport => "airport",
            CacheNamespace::Radius => "radius",
            CacheNamespace::Neighbors => "neighbors",
            CacheNamespace::Distance => "distance",
            CacheNamespace::Route => "route",
            CacheNamespace::Country => "country",
        }
    }
}

fn sorted_pair(a: AirportId, b: AirportId) -> (AirportId, AirportId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn airport(id: AirportId) -> String {
    format!("airport:{id}")
}

pub fn neighbors(id: AirportId) -> String {
    format!("neighbors:{id}")
}

pub fn airports_in_radius(lat: f64, lon: f64, radius_km: f64) -> String {
    format!("airports:radius:{lat}:{lon}:{radius_km}")
}

pub fn distance(a: AirportId, b: AirportId) -> String {
    let (lo, hi) = sorted_pair(a, b);
    format!("distance:{lo}:{hi}")
}

pub fn route(from: AirportId, to: AirportId) -> String {
    let (lo, hi) = sorted_pair(from, to);
    format!("route:{lo}:{hi}")
}

pub fn airports_by_country(country: &str) -> String {
    format!("airports:country:{}", country.to_lowercase())
}

pub fn country_comparison(country1: &str, country2: &str) -> String {
    let c1 = country1.to_lowercase();
    let c2 = country2.to_lowercase();
    let (lo, hi) = if c1 <= c2 { (c1, c2) } else { (c2, c1) };
    format!("country:comparison:{lo}:{hi}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_keys_ignore_direction() {
        assert_eq!(distance(3, 12), distance(12, 3));
        assert_eq!(distance(3, 12), "distance:3:12");
        assert_eq!(route(507, 26), route(26, 507));
        assert_eq!(route(507, 26), "route:26:507");
    }

    #[test]
    fn pair_sorting_is_numeric() {
        // Lexicographic sorting would put 10 before 9.
        assert_eq!(route(10, 9), "route:9:10");
    }

    #[test]
    fn radius_keys_keep_raw_coordinates() {
        assert_eq!(
            airports_in_radius(51.5, -0.12, 100.0),
            "airports:radius:51.5:-0.12:100"
        );
        assert_ne!(
            airports_in_radius(0.1 + 0.2, 0.0, 10.0),
            airports_in_radius(0.3, 0.0, 10.0)
        );
    }

    #[test]
    fn country_keys_are_case_insensitive() {
        assert_eq!(airports_by_country("France"), "airports:country:france");
        assert_eq!(
            country_comparison("Spain", "france"),
            country_comparison("FRANCE", "spain")
        );
        assert_eq!(
            country_comparison("Spain", "France"),
            "country:comparison:france:spain"
        );
    }

    #[test]
    fn single_id_keys() {
        assert_eq!(airport(42), "airport:42");
        assert_eq!(neighbors(42), "neighbors:42");
    }
}
