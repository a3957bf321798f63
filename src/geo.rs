//! Geographic primitives: coordinates, great-circle distance, bounding envelopes.
//!
//! Distances are computed with the haversine formula on a spherical Earth
//! (radius 6371 km), which is accurate to well under 1% for the distances
//! a field team covers in a day.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees, positive north.
    pub latitude: f64,
    /// Longitude in decimal degrees, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance between two coordinates in meters.
#[must_use]
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a polyline in kilometers.
///
/// Straight accumulation over consecutive pairs; no noise filtering.
/// Empty and single-point polylines have length 0.
#[must_use]
pub fn polyline_length_km(coords: &[Coordinate]) -> f64 {
    coords
        .windows(2)
        .map(|pair| haversine_distance_m(pair[0], pair[1]))
        .sum::<f64>()
        / 1000.0
}

/// A latitude/longitude envelope used to frame map views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl Bounds {
    /// Compute the minimal envelope covering all coordinates.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn covering(coords: &[Coordinate]) -> Option<Self> {
        let first = coords.first()?;
        let mut bounds = Self {
            south: first.latitude,
            west: first.longitude,
            north: first.latitude,
            east: first.longitude,
        };
        for c in &coords[1..] {
            bounds.south = bounds.south.min(c.latitude);
            bounds.west = bounds.west.min(c.longitude);
            bounds.north = bounds.north.max(c.latitude);
            bounds.east = bounds.east.max(c.longitude);
        }
        Some(bounds)
    }

    /// Expand the envelope symmetrically by `degrees` on every side.
    #[must_use]
    pub fn padded(self, degrees: f64) -> Self {
        Self {
            south: self.south - degrees,
            west: self.west - degrees,
            north: self.north + degrees,
            east: self.east + degrees,
        }
    }

    /// Center of the envelope.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Check whether a coordinate lies within the envelope (inclusive).
    #[must_use]
    pub fn contains(&self, c: Coordinate) -> bool {
        c.latitude >= self.south
            && c.latitude <= self.north
            && c.longitude >= self.west
            && c.longitude <= self.east
    }
}
