use geo::{BoundingRect, Centroid, MultiPoint};
use serde::{Deserialize, Serialize};

use crate::{geomath::GeoPoint, Error, Result};

/// Zoom used when there is nothing to frame.
pub const DEFAULT_ZOOM: u8 = 13;

/// Zoom used to frame a single point.
pub const SINGLE_POINT_ZOOM: u8 = 15;

/// Largest coordinate span (degrees) that still fits each zoom level, widest first.
const ZOOM_THRESHOLDS: [(f64, u8); 5] = [(1.0, 10), (0.5, 11), (0.1, 13), (0.05, 14), (0.01, 15)];

/// Zoom for spans below every threshold.
const MAX_ZOOM: u8 = 16;

/// Axis-aligned lat/lon box around a set of points, plus its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub center_lat: f64,
    pub center_lon: f64,
}

impl BoundingBox {
    #[inline] pub fn lat_span(&self) -> f64 { self.max_lat - self.min_lat }

    #[inline] pub fn lon_span(&self) -> f64 { self.max_lon - self.min_lon }

    /// Midpoint of the box; valid because it lies between valid corners.
    #[inline] pub fn center(&self) -> GeoPoint { GeoPoint::new_unchecked(self.center_lat, self.center_lon) }
}

fn to_multipoint(points: &[GeoPoint]) -> MultiPoint<f64> {
    points.iter().map(|&p| geo::Point::from(p)).collect()
}

/// Compute the bounding box of `points`. Fails with `EmptyInput` on an empty slice.
pub fn bounding_box(points: &[GeoPoint]) -> Result<BoundingBox> {
    let rect = to_multipoint(points).bounding_rect().ok_or(Error::EmptyInput)?;
    let (min, max) = (rect.min(), rect.max());

    Ok(BoundingBox {
        min_lat: min.y,
        max_lat: max.y,
        min_lon: min.x,
        max_lon: max.x,
        center_lat: (min.y + max.y) / 2.0,
        center_lon: (min.x + max.x) / 2.0,
    })
}

/// Arithmetic mean of `points`, or `None` if there are none.
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    to_multipoint(points).centroid()
        .and_then(|c| GeoPoint::try_from(c).ok())
}

/// Map zoom level (1..=20) that frames all `points`.
///
/// Wider spreads get lower zooms. Empty input yields [`DEFAULT_ZOOM`] and a
/// single point yields [`SINGLE_POINT_ZOOM`].
pub fn zoom_level(points: &[GeoPoint]) -> u8 {
    match points.len() {
        0 => return DEFAULT_ZOOM,
        1 => return SINGLE_POINT_ZOOM,
        _ => {}
    }

    let Ok(bbox) = bounding_box(points) else { return DEFAULT_ZOOM };
    let spread = bbox.lat_span().max(bbox.lon_span());

    ZOOM_THRESHOLDS.iter()
        .find(|&&(limit, _)| spread > limit)
        .map_or(MAX_ZOOM, |&(_, zoom)| zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint { GeoPoint::new(lat, lon).unwrap() }

    #[test]
    fn empty_bbox_is_error() {
        assert_eq!(bounding_box(&[]), Err(Error::EmptyInput));
    }

    #[test]
    fn bbox_corners_and_center() {
        let bbox = bounding_box(&[pt(19.40, -99.20), pt(19.50, -99.10), pt(19.45, -99.15)]).unwrap();
        assert_eq!(bbox.min_lat, 19.40);
        assert_eq!(bbox.max_lat, 19.50);
        assert_eq!(bbox.min_lon, -99.20);
        assert_eq!(bbox.max_lon, -99.10);
        assert!((bbox.center_lat - 19.45).abs() < 1e-9);
        assert!((bbox.center_lon + 99.15).abs() < 1e-9);
    }

    #[test]
    fn centroid_is_mean() {
        let c = centroid(&[pt(10.0, 20.0), pt(12.0, 24.0)]).unwrap();
        assert!((c.latitude() - 11.0).abs() < 1e-9);
        assert!((c.longitude() - 22.0).abs() < 1e-9);
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn zoom_defaults() {
        assert_eq!(zoom_level(&[]), 13);
        assert_eq!(zoom_level(&[pt(19.0, -99.0)]), 15);
        assert_eq!(zoom_level(&[pt(19.0, -99.0), pt(19.0, -99.0)]), 16);
    }

    #[test]
    fn zoom_thresholds() {
        let base = pt(19.0, -99.0);
        let cases = [(2.0, 10), (0.7, 11), (0.3, 13), (0.07, 14), (0.02, 15), (0.005, 16)];
        for (delta, expected) in cases {
            let zoom = zoom_level(&[base, pt(19.0 + delta, -99.0)]);
            assert_eq!(zoom, expected, "lat delta {delta}");
            let zoom = zoom_level(&[base, pt(19.0, -99.0 + delta)]);
            assert_eq!(zoom, expected, "lon delta {delta}");
        }
    }

    #[test]
    fn zoom_decreases_with_spread() {
        let base = pt(0.0, 0.0);
        let mut last = u8::MAX;
        for delta in [0.001, 0.02, 0.06, 0.2, 0.6, 3.0, 40.0] {
            let zoom = zoom_level(&[base, pt(delta, 0.0)]);
            assert!(zoom <= last);
            assert!((1..=20).contains(&zoom));
            last = zoom;
        }
    }
}
