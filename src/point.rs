//! Location point types for fieldtrack.
//!
//! A [`LocationPoint`] is one GPS sample taken by a field device while a
//! route is being executed. Points are immutable and append-only: they are
//! created by the position sampler, stored as-is, and never updated or
//! deleted by this crate (retention is an external policy).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A single GPS sample bound to a route.
///
/// The wire form uses camelCase keys and an epoch-milliseconds timestamp,
/// matching the mobile client's payload. There is no ordering guarantee at
/// write time; consumers must sort by timestamp before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPoint {
    /// Unique identifier for this point (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,

    /// The route this sample belongs to.
    pub route_id: String,

    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// When the fix was taken (epoch milliseconds on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Reported horizontal accuracy in meters, if available.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accuracy: Option<f64>,

    /// Reported ground speed in meters per second, if available.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speed: Option<f64>,

    /// Reported heading in degrees from true north, if available.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub heading: Option<f64>,

    /// Device battery level in percent, if available.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub battery_level: Option<u8>,
}

impl LocationPoint {
    /// Create a new point with only the required fields set.
    #[must_use]
    pub fn new(route_id: impl Into<String>, coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            route_id: route_id.into(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            timestamp,
            accuracy: None,
            speed: None,
            heading: None,
            battery_level: None,
        }
    }

    /// The coordinate of this sample.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// The timestamp as epoch milliseconds (the wire form).
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Build a timestamp from epoch milliseconds.
    ///
    /// Returns `None` for values outside chrono's representable range.
    #[must_use]
    pub fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point() -> LocationPoint {
        LocationPoint::new(
            "route-1",
            Coordinate::new(-23.55, -46.63),
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        )
    }

    #[test]
    fn test_new_point() {
        let point = sample_point();
        assert!(point.id.is_none());
        assert_eq!(point.route_id, "route-1");
        assert!(point.accuracy.is_none());
        assert!(point.battery_level.is_none());
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let point = sample_point();
        let coord = point.coordinate();
        assert!((coord.latitude - -23.55).abs() < f64::EPSILON);
        assert!((coord.longitude - -46.63).abs() < f64::EPSILON);
    }

    #[test]
    fn test_timestamp_millis() {
        let point = sample_point();
        assert_eq!(point.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_timestamp_from_millis() {
        let ts = LocationPoint::timestamp_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_wire_format_camel_case() {
        let mut point = sample_point();
        point.battery_level = Some(87);

        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"routeId\":\"route-1\""));
        assert!(json.contains("\"timestamp\":1700000000000"));
        assert!(json.contains("\"batteryLevel\":87"));
        // Unset optionals are omitted entirely
        assert!(!json.contains("accuracy"));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_deserialize_client_payload() {
        let json = r#"{
            "routeId": "route-9",
            "latitude": -23.5,
            "longitude": -46.6,
            "timestamp": 1700000060000,
            "accuracy": 12.5,
            "speed": 8.3,
            "heading": 270.0,
            "batteryLevel": 64
        }"#;

        let point: LocationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.route_id, "route-9");
        assert_eq!(point.timestamp_millis(), 1_700_000_060_000);
        assert_eq!(point.accuracy, Some(12.5));
        assert_eq!(point.speed, Some(8.3));
        assert_eq!(point.heading, Some(270.0));
        assert_eq!(point.battery_level, Some(64));
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let json = r#"{
            "routeId": "route-9",
            "latitude": 1.0,
            "longitude": 2.0,
            "timestamp": 0
        }"#;

        let point: LocationPoint = serde_json::from_str(json).unwrap();
        assert!(point.accuracy.is_none());
        assert!(point.speed.is_none());
        assert!(point.heading.is_none());
        assert!(point.battery_level.is_none());
    }
}
