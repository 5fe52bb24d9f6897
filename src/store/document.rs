use serde_json::Value;

use crate::geomath::GeoPoint;

/// Numbers are sometimes stored as strings; accept both.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings are sometimes stored as numbers; accept both.
pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First of `names` present on `doc` that coerces to a string.
pub(crate) fn string_field(doc: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| doc.get(name).and_then(as_string))
}

fn number_field(doc: &Value, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| doc.get(name).and_then(as_f64))
}

/// Read a lat/lon pair from an object, tolerating the usual field spellings.
fn point_from(obj: &Value) -> Option<GeoPoint> {
    let lat = number_field(obj, &["latitude", "lat"])?;
    let lon = number_field(obj, &["longitude", "lng", "lon"])?;
    GeoPoint::new(lat, lon).ok()
}

/// Coordinates of a document: a nested `coords`/`location` object, or
/// top-level lat/lon fields. Out-of-range values yield `None`.
pub(crate) fn point_field(doc: &Value) -> Option<GeoPoint> {
    ["coords", "location", "coordinates"].iter()
        .find_map(|name| doc.get(name).filter(|v| v.is_object()))
        .map_or_else(|| point_from(doc), point_from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerces_numbers_and_strings() {
        assert_eq!(as_f64(&json!("  12.5 ")), Some(12.5));
        assert_eq!(as_f64(&json!(3)), Some(3.0));
        assert_eq!(as_f64(&json!("abc")), None);
        assert_eq!(as_f64(&json!(null)), None);
        assert_eq!(as_string(&json!(42)), Some("42".into()));
        assert_eq!(as_string(&json!(true)), None);
    }

    #[test]
    fn nested_object_wins_over_top_level() {
        let doc = json!({ "coords": { "lat": 1.0, "lng": 2.0 }, "lat": 5.0, "lng": 6.0 });
        assert_eq!(point_field(&doc), Some(GeoPoint::new(1.0, 2.0).unwrap()));

        let doc = json!({ "latitude": 5.0, "longitude": 6.0 });
        assert_eq!(point_field(&doc), Some(GeoPoint::new(5.0, 6.0).unwrap()));

        let doc = json!({ "coords": { "lat": 1.0 } });
        assert_eq!(point_field(&doc), None);
    }
}
