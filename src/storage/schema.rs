//! `SQLite` schema definitions for fieldtrack.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the tracking points table.
///
/// Append-only: nothing in this crate updates or deletes rows. There is no
/// uniqueness constraint beyond the rowid; duplicate samples are accepted
/// and retention is an external policy.
pub const CREATE_TRACKING_POINTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS tracking_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    route_id TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    timestamp TEXT NOT NULL,
    accuracy REAL,
    speed REAL,
    heading REAL,
    battery_level INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `route_id` for per-route queries.
pub const CREATE_ROUTE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_tracking_points_route ON tracking_points(route_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_TRACKING_POINTS_TABLE,
    CREATE_ROUTE_INDEX,
    CREATE_METADATA_TABLE,
];
