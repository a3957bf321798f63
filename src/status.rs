//! Derived execution status for stops.
//!
//! There is deliberately no persisted "current status" column anywhere:
//! the status of a stop is recomputed on every read from the raw execution
//! fields, so the route subsystem and this crate never need synchronized
//! writes to agree on a second source of truth.

use serde::{Deserialize, Serialize};

use crate::route::ExecutionRecord;

/// Outcome code meaning the stop's service was completed.
pub const STATUS_COMPLETED: &str = "completed";

/// Prefix of the outcome code family for stops that could not be completed,
/// e.g. `not_completed_cliente_ausente`.
pub const STATUS_NOT_COMPLETED_PREFIX: &str = "not_completed";

/// Execution status of a stop, derived on demand.
///
/// Conceptual state machine, driven by external writes to the execution
/// record: `Pending -> InProgress -> {Completed | NotCompleted}`. The
/// resolver only classifies a snapshot; it never mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStopStatus {
    /// Not started yet.
    Pending,
    /// Started but not finished, and no outcome recorded.
    InProgress,
    /// Service completed.
    Completed,
    /// Service could not be completed (any reason code).
    NotCompleted,
}

impl std::fmt::Display for DerivedStopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::NotCompleted => write!(f, "not_completed"),
        }
    }
}

impl DerivedStopStatus {
    /// Whether this status is terminal (no further transitions expected).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::NotCompleted)
    }
}

/// Classify an execution record into a derived status.
///
/// Fixed precedence, first match wins:
/// 1. outcome code `completed`
/// 2. outcome code in the `not_completed` family
/// 3. started without a finish timestamp
/// 4. pending
///
/// Total over all inputs: null and unknown status strings fall through to
/// the timestamp rules rather than failing, preserving dashboard
/// availability when the external contract drifts.
#[must_use]
pub fn resolve(record: &ExecutionRecord) -> DerivedStopStatus {
    if let Some(status) = record.status.as_deref() {
        if status == STATUS_COMPLETED {
            return DerivedStopStatus::Completed;
        }
        if status.starts_with(STATUS_NOT_COMPLETED_PREFIX) {
            return DerivedStopStatus::NotCompleted;
        }
    }

    if record.started_at.is_some() && record.finished_at.is_none() {
        return DerivedStopStatus::InProgress;
    }

    DerivedStopStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(
        status: Option<&str>,
        started_ms: Option<i64>,
        finished_ms: Option<i64>,
    ) -> ExecutionRecord {
        ExecutionRecord {
            status: status.map(String::from),
            started_at: started_ms.map(|ms| Utc.timestamp_millis_opt(ms).unwrap()),
            finished_at: finished_ms.map(|ms| Utc.timestamp_millis_opt(ms).unwrap()),
        }
    }

    #[test]
    fn test_completed_wins_over_missing_timestamps() {
        let status = resolve(&record(Some("completed"), None, None));
        assert_eq!(status, DerivedStopStatus::Completed);
    }

    #[test]
    fn test_completed_wins_over_open_timestamps() {
        let status = resolve(&record(Some("completed"), Some(1_000), None));
        assert_eq!(status, DerivedStopStatus::Completed);
    }

    #[test]
    fn test_not_completed_family_prefix() {
        let status = resolve(&record(Some("not_completed_cliente_ausente"), None, None));
        assert_eq!(status, DerivedStopStatus::NotCompleted);
    }

    #[test]
    fn test_not_completed_regardless_of_timestamps() {
        let status = resolve(&record(
            Some("not_completed_problema_tecnico"),
            Some(1_000),
            Some(2_000),
        ));
        assert_eq!(status, DerivedStopStatus::NotCompleted);
    }

    #[test]
    fn test_started_without_finish_is_in_progress() {
        let status = resolve(&record(None, Some(1_000), None));
        assert_eq!(status, DerivedStopStatus::InProgress);
    }

    #[test]
    fn test_started_and_finished_without_outcome_is_pending() {
        // A finish timestamp without an outcome code means the external
        // record is mid-write; fall back to pending rather than guessing.
        let status = resolve(&record(None, Some(1_000), Some(2_000)));
        assert_eq!(status, DerivedStopStatus::Pending);
    }

    #[test]
    fn test_all_empty_is_pending() {
        let status = resolve(&record(None, None, None));
        assert_eq!(status, DerivedStopStatus::Pending);
    }

    #[test]
    fn test_unknown_status_falls_through_to_timestamps() {
        let status = resolve(&record(Some("something_unexpected"), Some(1_000), None));
        assert_eq!(status, DerivedStopStatus::InProgress);

        let status = resolve(&record(Some("something_unexpected"), None, None));
        assert_eq!(status, DerivedStopStatus::Pending);
    }

    #[test]
    fn test_empty_string_status_is_pending() {
        let status = resolve(&record(Some(""), None, None));
        assert_eq!(status, DerivedStopStatus::Pending);
    }

    #[test]
    fn test_display() {
        assert_eq!(DerivedStopStatus::Pending.to_string(), "pending");
        assert_eq!(DerivedStopStatus::InProgress.to_string(), "in_progress");
        assert_eq!(DerivedStopStatus::Completed.to_string(), "completed");
        assert_eq!(DerivedStopStatus::NotCompleted.to_string(), "not_completed");
    }

    #[test]
    fn test_is_terminal() {
        assert!(!DerivedStopStatus::Pending.is_terminal());
        assert!(!DerivedStopStatus::InProgress.is_terminal());
        assert!(DerivedStopStatus::Completed.is_terminal());
        assert!(DerivedStopStatus::NotCompleted.is_terminal());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&DerivedStopStatus::NotCompleted).unwrap();
        assert_eq!(json, "\"not_completed\"");
    }
}
