//! Live route progress aggregation.
//!
//! Dashboards poll these summaries on a fixed cadence; every call is a
//! full recomputation over the route's stops. There is no cached or
//! incremental state anywhere, which keeps the aggregator trivially safe
//! to call concurrently and acceptable for the small per-route stop
//! counts this system sees.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::route::Route;
use crate::status::{resolve, DerivedStopStatus};

/// Aggregate completion metrics for one route, recomputed per poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProgress {
    /// The route being summarized.
    pub route_id: String,
    /// Route display title.
    pub title: String,
    /// Display name of the responsible technician or team.
    pub responsible_name: String,
    /// Total number of stops on the route.
    pub total_stops: usize,
    /// Stops whose execution record resolves to completed.
    pub completed_stops: usize,
    /// Stops not yet completed.
    pub remaining_stops: usize,
    /// Whole minutes since the route started, 0 if not started.
    pub elapsed_minutes: i64,
    /// Completed share of stops, rounded to the nearest percent.
    pub progress_percent: u32,
}

/// Summarize a route's progress as of now.
#[must_use]
pub fn summarize(route: &Route) -> RouteProgress {
    summarize_at(route, Utc::now())
}

/// Summarize a route's progress at an explicit instant.
///
/// Pure over its inputs; `now` is injected so callers and tests get
/// deterministic elapsed-time figures.
#[must_use]
pub fn summarize_at(route: &Route, now: DateTime<Utc>) -> RouteProgress {
    let total_stops = route.stops.len();
    let completed_stops = route
        .stops
        .iter()
        .filter(|s| resolve(&s.execution) == DerivedStopStatus::Completed)
        .count();

    let progress_percent = if total_stops > 0 {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((completed_stops as f64 / total_stops as f64) * 100.0).round() as u32
        }
    } else {
        0
    };

    let elapsed_minutes = route
        .started_at
        .map_or(0, |started| (now - started).num_minutes().max(0));

    RouteProgress {
        route_id: route.id.clone(),
        title: route.title.clone(),
        responsible_name: route.responsible.name.clone(),
        total_stops,
        completed_stops,
        remaining_stops: total_stops - completed_stops,
        elapsed_minutes,
        progress_percent,
    }
}

/// Summarize every route currently in execution.
///
/// A route is in execution when it has started and not yet finished; the
/// result feeds the "routes in progress" dashboard board.
#[must_use]
pub fn in_progress(routes: &[Route], now: DateTime<Utc>) -> Vec<RouteProgress> {
    routes
        .iter()
        .filter(|r| r.is_in_progress())
        .map(|r| summarize_at(r, now))
        .collect()
}
