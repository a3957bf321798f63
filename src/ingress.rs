//! Ingestion boundary for location batches.
//!
//! The ingress sits between the network edge and the [`TrackingStore`]:
//! it checks the minimal shape of a batch and appends it atomically. A
//! batch either lands whole or is rejected whole; there is no partial
//! acceptance and no silent coercion of bad values.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::point::LocationPoint;
use crate::storage::TrackingStore;

/// Accepts location batches and persists them append-only.
#[derive(Debug)]
pub struct LocationIngress {
    store: TrackingStore,
}

impl LocationIngress {
    /// Create an ingress over the given store.
    #[must_use]
    pub fn new(store: TrackingStore) -> Self {
        Self { store }
    }

    /// Validate and append a batch of points.
    ///
    /// A batch belongs to exactly one route; every point must carry that
    /// route id and a coordinate within WGS84 range. On success the whole
    /// batch is committed in one transaction and the stored count is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatch`] if the batch fails validation, or a
    /// storage error if the transaction fails. In both cases nothing from
    /// the batch is stored.
    pub fn append(&mut self, points: &[LocationPoint]) -> Result<usize> {
        if let Err(e) = Self::validate(points) {
            warn!("Rejected location batch: {e}");
            return Err(e);
        }

        let count = self.store.append_batch(points)?;
        info!(
            "Stored {} points for route {}",
            count, points[0].route_id
        );
        Ok(count)
    }

    /// Borrow the underlying store for read-side queries.
    #[must_use]
    pub fn store(&self) -> &TrackingStore {
        &self.store
    }

    /// Consume the ingress, returning the underlying store.
    #[must_use]
    pub fn into_store(self) -> TrackingStore {
        self.store
    }

    fn validate(points: &[LocationPoint]) -> Result<()> {
        let Some(first) = points.first() else {
            return Err(Error::invalid_batch("batch is empty"));
        };

        if first.route_id.is_empty() {
            return Err(Error::invalid_batch("point is missing a route id"));
        }

        for point in points {
            if point.route_id.is_empty() {
                return Err(Error::invalid_batch("point is missing a route id"));
            }
            if point.route_id != first.route_id {
                return Err(Error::invalid_batch(format!(
                    "batch mixes routes {} and {}",
                    first.route_id, point.route_id
                )));
            }
            if !point.coordinate().is_valid() {
                return Err(Error::invalid_batch(format!(
                    "coordinate out of range: ({}, {})",
                    point.latitude, point.longitude
                )));
            }
        }

        Ok(())
    }
}
