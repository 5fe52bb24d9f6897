use geo::{Distance, HaversineMeasure};

use crate::geomath::GeoPoint;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
///
/// Symmetric in its arguments, exactly zero for identical points, never negative.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_M).distance(geo::Point::from(*a), geo::Point::from(*b))
}
