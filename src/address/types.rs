use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{geomath::GeoPoint, store::document};

/// A residential address, the unit of input to route clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoPoint>,
}

impl Address {
    /// Construct an address without coordinates.
    pub fn new(street: impl Into<String>, number: impl Into<String>, neighborhood: impl Into<String>) -> Self {
        Self { street: street.into(), number: number.into(), neighborhood: neighborhood.into(), coords: None }
    }

    /// Attach geocoded coordinates.
    #[inline]
    pub fn with_coords(mut self, coords: GeoPoint) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Coerce a loosely-typed store document into an `Address`.
    ///
    /// Returns `None` when there is no usable street. Numbers stored as JSON
    /// numbers are accepted for `number`, and coordinates that fail range
    /// validation are dropped rather than trusted.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let street = document::string_field(doc, &["street", "calle"])?;
        if street.trim().is_empty() { return None }

        Some(Self {
            street,
            number: document::string_field(doc, &["number", "numero"]).unwrap_or_default(),
            neighborhood: document::string_field(doc, &["neighborhood", "colonia"]).unwrap_or_default(),
            coords: document::point_field(doc),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_document_coerces_fields() {
        let doc = json!({
            "street": "Av. Juárez",
            "number": 120,
            "neighborhood": "Centro",
            "coords": { "lat": "19.43", "lng": -99.14 },
        });
        let address = Address::from_document(&doc).unwrap();
        assert_eq!(address.number, "120");
        assert_eq!(address.neighborhood, "Centro");
        assert_eq!(address.coords, Some(GeoPoint::new(19.43, -99.14).unwrap()));
    }

    #[test]
    fn from_document_drops_bad_coords_and_requires_street() {
        let doc = json!({ "street": "Calle 5", "coords": { "lat": 191.0, "lng": 0.0 } });
        let address = Address::from_document(&doc).unwrap();
        assert!(address.coords.is_none());
        assert_eq!(address.number, "");

        assert!(Address::from_document(&json!({ "number": "4" })).is_none());
        assert!(Address::from_document(&json!({ "street": "   " })).is_none());
    }
}
