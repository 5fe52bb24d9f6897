mod bbox;
mod distance;
mod point;

pub use bbox::{bounding_box, centroid, zoom_level, BoundingBox, DEFAULT_ZOOM, SINGLE_POINT_ZOOM};
pub use distance::{distance_meters, EARTH_RADIUS_M};
pub use point::GeoPoint;
