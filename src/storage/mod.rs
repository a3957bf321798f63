//! Storage layer for fieldtrack.
//!
//! This module provides `SQLite`-based persistent storage for location
//! points as an append-only, per-route log. Rows are never updated or
//! deleted here; retention and compaction belong to an external policy.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::point::LocationPoint;

/// Append-only store for location points.
///
/// Writes are independent across routes and need no cross-route
/// coordination; within a route, concurrent appends from one or more
/// devices are accepted without ordering enforcement. The read side sorts.
#[derive(Debug)]
pub struct TrackingStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl TrackingStore {
    /// Open or create a tracking database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a batch of points inside a single transaction.
    ///
    /// The whole batch commits or the whole batch rolls back; there are no
    /// partial writes. Shape validation belongs to the ingress, which is
    /// the only caller outside of tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; no point is stored then.
    pub fn append_batch(&mut self, points: &[LocationPoint]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for point in points {
            tx.execute(
                r"
                INSERT INTO tracking_points
                    (route_id, latitude, longitude, timestamp, accuracy, speed, heading, battery_level)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
                params![
                    point.route_id,
                    point.latitude,
                    point.longitude,
                    point.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                    point.accuracy,
                    point.speed,
                    point.heading,
                    point.battery_level,
                ],
            )?;
        }
        tx.commit()?;

        debug!("Appended {} points", points.len());
        Ok(points.len())
    }

    /// Get all points for a route.
    ///
    /// Rows come back in insertion order, which is deliberately not time
    /// order; callers must sort by timestamp before building a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn query_route(&self, route_id: &str) -> Result<Vec<LocationPoint>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, route_id, latitude, longitude, timestamp, accuracy, speed, heading, battery_level
            FROM tracking_points WHERE route_id = ?1
            ",
        )?;

        let points = stmt
            .query_map([route_id], Self::row_to_point)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(points)
    }

    /// Count all stored points.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM tracking_points", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Count stored points for one route.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_for_route(&self, route_id: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tracking_points WHERE route_id = ?1",
            [route_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_points = self.count()?;

        let routes_tracked: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT route_id) FROM tracking_points",
            [],
            |row| row.get(0),
        )?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM tracking_points ORDER BY timestamp ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM tracking_points ORDER BY timestamp DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let oldest_point = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_point = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_points,
            routes_tracked,
            oldest_point,
            newest_point,
            db_size_bytes,
        })
    }

    /// Convert a database row to a `LocationPoint`.
    fn row_to_point(row: &rusqlite::Row) -> rusqlite::Result<LocationPoint> {
        let id: i64 = row.get(0)?;
        let route_id: String = row.get(1)?;
        let latitude: f64 = row.get(2)?;
        let longitude: f64 = row.get(3)?;
        let timestamp_str: String = row.get(4)?;
        let accuracy: Option<f64> = row.get(5)?;
        let speed: Option<f64> = row.get(6)?;
        let heading: Option<f64> = row.get(7)?;
        let battery_level: Option<u8> = row.get(8)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str).map_or_else(
            |_| {
                warn!("Unparseable timestamp in row {}: {}", id, timestamp_str);
                Utc::now()
            },
            |dt| dt.with_timezone(&Utc),
        );

        Ok(LocationPoint {
            id: Some(id),
            route_id,
            latitude,
            longitude,
            timestamp,
            accuracy,
            speed,
            heading,
            battery_level,
        })
    }
}

/// Statistics about the tracking store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Total number of points stored.
    pub total_points: i64,
    /// Number of distinct routes with at least one point.
    pub routes_tracked: i64,
    /// Timestamp of the oldest point.
    pub oldest_point: Option<DateTime<Utc>>,
    /// Timestamp of the newest point.
    pub newest_point: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use chrono::TimeZone;

    fn create_test_store() -> TrackingStore {
        TrackingStore::open_in_memory().expect("failed to create test store")
    }

    fn create_test_point(route_id: &str, millis: i64) -> LocationPoint {
        LocationPoint::new(
            route_id,
            Coordinate::new(-23.55, -46.63),
            Utc.timestamp_millis_opt(millis).unwrap(),
        )
    }

    #[test]
    fn test_open_in_memory() {
        let store = TrackingStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_append_and_query() {
        let mut store = create_test_store();
        let points = vec![
            create_test_point("route-1", 1_000),
            create_test_point("route-1", 2_000),
        ];

        let appended = store.append_batch(&points).unwrap();
        assert_eq!(appended, 2);

        let stored = store.query_route("route-1").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].id.is_some());
        assert_eq!(stored[0].route_id, "route-1");
    }

    #[test]
    fn test_append_preserves_optional_fields() {
        let mut store = create_test_store();
        let mut point = create_test_point("route-1", 1_000);
        point.accuracy = Some(8.5);
        point.speed = Some(12.0);
        point.heading = Some(183.0);
        point.battery_level = Some(42);

        store.append_batch(&[point]).unwrap();

        let stored = store.query_route("route-1").unwrap();
        assert_eq!(stored[0].accuracy, Some(8.5));
        assert_eq!(stored[0].speed, Some(12.0));
        assert_eq!(stored[0].heading, Some(183.0));
        assert_eq!(stored[0].battery_level, Some(42));
    }

    #[test]
    fn test_append_preserves_millisecond_timestamps() {
        let mut store = create_test_store();
        let point = create_test_point("route-1", 1_700_000_000_123);

        store.append_batch(&[point]).unwrap();

        let stored = store.query_route("route-1").unwrap();
        assert_eq!(stored[0].timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_query_routes_are_isolated() {
        let mut store = create_test_store();
        store
            .append_batch(&[create_test_point("route-a", 1_000)])
            .unwrap();
        store
            .append_batch(&[
                create_test_point("route-b", 2_000),
                create_test_point("route-b", 3_000),
            ])
            .unwrap();

        assert_eq!(store.query_route("route-a").unwrap().len(), 1);
        assert_eq!(store.query_route("route-b").unwrap().len(), 2);
        assert_eq!(store.query_route("route-c").unwrap().len(), 0);
    }

    #[test]
    fn test_query_returns_insertion_order_not_time_order() {
        let mut store = create_test_store();
        // Scrambled delivery: newest first
        store
            .append_batch(&[
                create_test_point("route-1", 3_000),
                create_test_point("route-1", 1_000),
                create_test_point("route-1", 2_000),
            ])
            .unwrap();

        let stored = store.query_route("route-1").unwrap();
        let millis: Vec<i64> = stored.iter().map(LocationPoint::timestamp_millis).collect();
        assert_eq!(millis, vec![3_000, 1_000, 2_000]);
    }

    #[test]
    fn test_duplicate_points_are_kept() {
        // No deduplication: identical samples are two rows.
        let mut store = create_test_store();
        let point = create_test_point("route-1", 1_000);
        store.append_batch(&[point.clone()]).unwrap();
        store.append_batch(&[point]).unwrap();

        assert_eq!(store.count_for_route("route-1").unwrap(), 2);
    }

    #[test]
    fn test_count() {
        let mut store = create_test_store();
        assert_eq!(store.count().unwrap(), 0);

        store
            .append_batch(&[
                create_test_point("route-1", 1_000),
                create_test_point("route-2", 2_000),
            ])
            .unwrap();

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.routes_tracked, 0);
        assert!(stats.oldest_point.is_none());
        assert!(stats.newest_point.is_none());
    }

    #[test]
    fn test_stats_with_data() {
        let mut store = create_test_store();
        store
            .append_batch(&[
                create_test_point("route-1", 1_000),
                create_test_point("route-2", 9_000),
            ])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_points, 2);
        assert_eq!(stats.routes_tracked, 2);
        assert_eq!(stats.oldest_point.unwrap().timestamp_millis(), 1_000);
        assert_eq!(stats.newest_point.unwrap().timestamp_millis(), 9_000);
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("fieldtrack_test_{}.db", std::process::id()));

        let mut store = TrackingStore::open(&db_path).unwrap();
        store
            .append_batch(&[create_test_point("route-1", 1_000)])
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.path(), db_path);

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "fieldtrack_test_{}/nested/db.sqlite",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = TrackingStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[test]
    fn test_empty_batch_is_a_noop() {
        let mut store = create_test_store();
        let appended = store.append_batch(&[]).unwrap();
        assert_eq!(appended, 0);
        assert_eq!(store.count().unwrap(), 0);
    }
}
