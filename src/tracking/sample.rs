use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geomath::GeoPoint;

/// One fix from a driver's position feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    pub position: GeoPoint,
    #[serde(default)]
    pub speed_kmh: f64,
    #[serde(default)]
    pub heading_deg: f64,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(position: GeoPoint, speed_kmh: f64, heading_deg: f64, timestamp: DateTime<Utc>) -> Self {
        Self { position, speed_kmh, heading_deg, timestamp }
    }
}
