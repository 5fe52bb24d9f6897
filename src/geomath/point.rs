use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A WGS84 coordinate in decimal degrees.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180];
/// both deserialization and [`GeoPoint::new`] reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLon")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

/// Wire shape accepted for a point, tolerating the common short field names.
#[derive(Deserialize)]
struct LatLon {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    longitude: f64,
}

impl TryFrom<LatLon> for GeoPoint {
    type Error = Error;

    fn try_from(value: LatLon) -> Result<Self> { Self::new(value.latitude, value.longitude) }
}

impl GeoPoint {
    /// Construct a point, validating coordinate ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!("latitude {latitude} out of range [-90, 90]")));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!("longitude {longitude} out of range [-180, 180]")));
        }
        Ok(Self { latitude, longitude })
    }

    /// Construct from coordinates already known to be in range.
    #[inline]
    pub(crate) fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        debug_assert!((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude));
        Self { latitude, longitude }
    }

    #[inline] pub fn latitude(&self) -> f64 { self.latitude }

    #[inline] pub fn longitude(&self) -> f64 { self.longitude }
}

impl From<GeoPoint> for geo::Point<f64> {
    /// geo uses (x, y) = (lon, lat).
    #[inline]
    fn from(p: GeoPoint) -> Self { geo::Point::new(p.longitude, p.latitude) }
}

impl TryFrom<geo::Point<f64>> for GeoPoint {
    type Error = Error;

    #[inline]
    fn try_from(p: geo::Point<f64>) -> Result<Self> { Self::new(p.y(), p.x()) }
}
