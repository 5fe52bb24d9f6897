//! Seams to the managed backend: document store and push delivery.
//!
//! Records cross these seams as loosely-typed JSON documents and are coerced
//! into typed values on read (see [`Resident::from_document`]).

pub(crate) mod document;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{address::Address, geomath::GeoPoint, tracking::PositionSample, Result};

pub use memory::{MemoryStore, RecordingNotifier};

/// A resident on a route, as far as proximity alerts are concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: String,
    /// Last known home location; residents without one are never alerted.
    pub coords: Option<GeoPoint>,
    /// Push handle; residents without one are tracked but not messaged.
    pub notify_handle: Option<String>,
}

impl Resident {
    /// Coerce a store document into a `Resident`. Returns `None` without an id.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let id = document::string_field(doc, &["id", "uid", "userId"])?;
        let notify_handle = document::string_field(doc, &["notifyHandle", "pushToken", "fcmToken"])
            .filter(|handle| !handle.trim().is_empty());

        Some(Self { id, coords: document::point_field(doc), notify_handle })
    }
}

/// Payload of a "truck nearby" push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub resident_id: String,
    pub route_id: String,
    pub driver_name: String,
    pub unit: String,
    /// Driver-to-resident distance, rounded to whole meters.
    pub distance_meters: u32,
}

/// Document storage as seen by the tracking core: read residents and
/// addresses, append position snapshots.
#[async_trait]
pub trait Store: Send + Sync {
    async fn residents_for_route(&self, route_id: &str) -> Result<Vec<Resident>>;

    async fn persist_position(&self, driver_id: &str, sample: &PositionSample) -> Result<()>;

    async fn all_addresses(&self) -> Result<Vec<Address>>;
}

/// Push delivery transport. Retries, if any, are the transport's business.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, handle: &str, event: &NotificationEvent) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resident_from_document() {
        let doc = json!({
            "uid": "r-1",
            "location": { "latitude": 19.4, "longitude": "-99.1" },
            "pushToken": "tok-1",
        });
        let resident = Resident::from_document(&doc).unwrap();
        assert_eq!(resident.id, "r-1");
        assert_eq!(resident.coords, Some(GeoPoint::new(19.4, -99.1).unwrap()));
        assert_eq!(resident.notify_handle.as_deref(), Some("tok-1"));
    }

    #[test]
    fn resident_without_id_or_handle() {
        assert!(Resident::from_document(&json!({ "lat": 1.0, "lng": 2.0 })).is_none());

        let resident = Resident::from_document(&json!({ "id": 7, "lat": 1.0, "lng": 2.0, "notifyHandle": "" })).unwrap();
        assert_eq!(resident.id, "7");
        assert!(resident.notify_handle.is_none());
        assert!(resident.coords.is_some());
    }

    #[test]
    fn event_uses_camel_case_fields() {
        let event = NotificationEvent {
            resident_id: "r".into(),
            route_id: "route".into(),
            driver_name: "Ana".into(),
            unit: "U-7".into(),
            distance_meters: 42,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["residentId"], "r");
        assert_eq!(value["distanceMeters"], 42);
    }
}
