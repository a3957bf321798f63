//! Reconstruction of a traveled path from stored points.
//!
//! The store hands back points in whatever order they were appended; this
//! module sorts them by timestamp, exposes the resulting polyline, and
//! derives display geometry: total distance and a padded map envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::{polyline_length_km, Bounds, Coordinate};
use crate::point::LocationPoint;

/// Result of reconstructing a route's traveled path.
///
/// An empty point set is a normal outcome (a route that was never
/// tracked), not an error, so it gets its own variant instead of an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    /// No points were recorded for the route.
    NoData,
    /// A time-ordered path of at least one point.
    Path(TrackedPath),
}

impl Reconstruction {
    /// Build a path from raw stored points.
    ///
    /// Sorts ascending by timestamp (stable, so equal timestamps keep
    /// their stored order) and keeps every point; nothing is dropped or
    /// filtered.
    #[must_use]
    pub fn build(mut points: Vec<LocationPoint>) -> Self {
        if points.is_empty() {
            return Self::NoData;
        }
        points.sort_by_key(|p| p.timestamp);
        Self::Path(TrackedPath { points })
    }

    /// The path, if any points were recorded.
    #[must_use]
    pub fn as_path(&self) -> Option<&TrackedPath> {
        match self {
            Self::NoData => None,
            Self::Path(path) => Some(path),
        }
    }
}

/// A time-ordered traveled path. Always holds at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPath {
    points: Vec<LocationPoint>,
}

impl TrackedPath {
    /// The points in ascending timestamp order.
    #[must_use]
    pub fn points(&self) -> &[LocationPoint] {
        &self.points
    }

    /// Number of points in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for idiomatic slice-like use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The polyline coordinates, for map rendering.
    #[must_use]
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.points.iter().map(LocationPoint::coordinate).collect()
    }

    /// First recorded point (start-of-route marker).
    #[must_use]
    pub fn start(&self) -> &LocationPoint {
        &self.points[0]
    }

    /// Last recorded point (current/final position marker).
    #[must_use]
    pub fn end(&self) -> &LocationPoint {
        &self.points[self.points.len() - 1]
    }

    /// Total traveled distance in kilometers.
    ///
    /// Straight haversine accumulation over consecutive pairs. GPS jitter
    /// is not filtered, so this overstates distance for noisy traces.
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        polyline_length_km(&self.coordinates())
    }

    /// Envelope covering the path, padded symmetrically for map framing.
    #[must_use]
    pub fn bounds(&self, padding_deg: f64) -> Bounds {
        // The path is never empty, so covering() always yields a value.
        Bounds::covering(&self.coordinates())
            .unwrap_or(Bounds {
                south: 0.0,
                west: 0.0,
                north: 0.0,
                east: 0.0,
            })
            .padded(padding_deg)
    }

    /// A serializable summary for dashboards and the CLI.
    #[must_use]
    pub fn summary(&self, padding_deg: f64) -> PathSummary {
        PathSummary {
            route_id: self.start().route_id.clone(),
            point_count: self.len(),
            distance_km: self.distance_km(),
            bounds: self.bounds(padding_deg),
            started_at: self.start().timestamp,
            last_seen_at: self.end().timestamp,
        }
    }
}

/// Display-oriented summary of a reconstructed path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    /// The route the path belongs to.
    pub route_id: String,
    /// Number of recorded points.
    pub point_count: usize,
    /// Total traveled distance in kilometers.
    pub distance_km: f64,
    /// Padded map envelope.
    pub bounds: Bounds,
    /// Timestamp of the first point.
    pub started_at: DateTime<Utc>,
    /// Timestamp of the last point.
    pub last_seen_at: DateTime<Utc>,
}
