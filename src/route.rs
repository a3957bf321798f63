//! Read models for routes, stops and execution records.
//!
//! These types mirror the route/appointment subsystem that owns the data.
//! This crate only reads them: routes and stops drive progress aggregation,
//! and each stop's [`ExecutionRecord`] feeds the derived status resolver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Whether a route is assigned to a single technician or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibleKind {
    /// An individual field technician.
    Technician,
    /// A team of technicians.
    Team,
}

impl std::fmt::Display for ResponsibleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Technician => write!(f, "technician"),
            Self::Team => write!(f, "team"),
        }
    }
}

/// The technician or team responsible for executing a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsible {
    /// Kind of assignee.
    pub kind: ResponsibleKind,
    /// Identifier in the external technician/team registry.
    pub id: i64,
    /// Display name for dashboards.
    pub name: String,
}

/// Externally owned record of a stop's real-world execution.
///
/// All fields are optional by contract: the owning subsystem may not have
/// written any of them yet, and unknown status strings must be tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionRecord {
    /// Outcome code: `completed`, a `not_completed_<reason>` code, or
    /// anything else (treated as unset).
    pub status: Option<String>,
    /// When execution started, if it has.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
}

/// One scheduled location visit within a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// Stop identifier.
    pub id: i64,
    /// The route this stop belongs to.
    pub route_id: String,
    /// Display and progress-counting order, unique within the route.
    pub order: u32,
    /// Location of the visit.
    pub coordinate: Coordinate,
    /// Human-readable address.
    pub address: String,
    /// Linkage to the external appointment, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub appointment_id: Option<i64>,
    /// Execution state owned by the appointment subsystem.
    #[serde(default)]
    pub execution: ExecutionRecord,
}

/// A route with its ordered sequence of stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Route identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Who executes the route.
    pub responsible: Responsible,
    /// Scheduling status owned by the route subsystem.
    pub status: String,
    /// When execution of the route started, if it has.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When execution of the route finished, if it has.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Stops, in no guaranteed order (see [`Route::stops_in_order`]).
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl Route {
    /// Stops sorted ascending by their `order` field.
    ///
    /// The owning subsystem guarantees unique orders per route, but not
    /// that the serialized sequence arrives sorted.
    #[must_use]
    pub fn stops_in_order(&self) -> Vec<&Stop> {
        let mut stops: Vec<&Stop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.order);
        stops
    }

    /// Whether the route is currently being executed.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.started_at.is_some() && self.finished_at.is_none()
    }
}
