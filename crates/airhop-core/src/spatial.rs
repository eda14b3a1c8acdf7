//! Great-circle distance math and unit conversions.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Kilometers in one statute mile.
pub const KM_PER_MILE: f64 = 1.60934;

/// Calculate distance between two points in kilometers using the Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in kilometers. Identical points yield 0, antipodal points
/// roughly half the great-circle circumference.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn miles_to_kilometers(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn kilometers_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

/// Degree extents of a box that contains every point within `radius_km` of
/// `(lat, lon)`. Used as a coarse prefilter before exact haversine checks.
///
/// Returns `(min_lat, max_lat, min_lon, max_lon)`. Near the poles, or when the
/// radius spans the antimeridian, the longitude range widens to the full
/// `[-180, 180]`.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let radius_km = radius_km.max(0.0);
    let dlat = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let min_lat = (lat - dlat).max(-90.0);
    let max_lat = (lat + dlat).min(90.0);

    // Widest longitude offset of the spherical cap, reached at the tangent
    // meridians rather than on the circle of latitude through the center.
    let angular = radius_km / EARTH_RADIUS_KM;
    let cos_lat = lat.to_radians().cos();
    if min_lat <= -90.0 || max_lat >= 90.0 || angular.sin() >= cos_lat {
        return (min_lat, max_lat, -180.0, 180.0);
    }

    let dlon = (angular.sin() / cos_lat).asin().to_degrees();
    let min_lon = lon - dlon;
    let max_lon = lon + dlon;
    if dlon >= 180.0 || min_lon < -180.0 || max_lon > 180.0 {
        return (min_lat, max_lat, -180.0, 180.0);
    }

    (min_lat, max_lat, min_lon, max_lon)
}
