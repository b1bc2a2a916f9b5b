//! Main store implementation.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use p1dash_types::{RawReading, Reading, timestamp_from_unix_seconds};

use crate::error::{Error, Result};
use crate::models::{ImportResult, TimeRange};
use crate::queries::ReadingQuery;
use crate::schema;

const INSERT_READING: &str = "INSERT OR IGNORE INTO readings
     (timestamp, active_power_w, total_power_import_kwh, total_power_export_kwh)
     VALUES (?1, ?2, ?3, ?4)";

/// SQLite-based store for meter readings.
///
/// The table is append-only and keyed by timestamp: re-inserting a sample with
/// a timestamp already present is a silent no-op.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Write operations
impl Store {
    /// Insert one reading, keeping power as reported by the device.
    ///
    /// Returns `false` when a reading with the same timestamp already exists.
    pub fn insert_reading(&self, reading: &Reading) -> Result<bool> {
        let changed = self.conn.execute(
            INSERT_READING,
            params![
                reading.unix_seconds(),
                reading.active_power_w,
                reading.import_kwh,
                reading.export_kwh
            ],
        )?;

        if changed == 0 {
            debug!("Reading at {} already stored", reading.timestamp);
        }
        Ok(changed > 0)
    }

    /// Insert many readings in one transaction.
    pub fn insert_readings(&self, readings: &[Reading]) -> Result<ImportResult> {
        let rows: Vec<RawReading> = readings.iter().map(RawReading::from).collect();
        self.insert_raw(&rows)
    }

    /// Insert stored-format rows in one transaction.
    ///
    /// Rows without a timestamp are counted as skipped.
    pub fn insert_raw(&self, rows: &[RawReading]) -> Result<ImportResult> {
        let tx = self.conn.unchecked_transaction()?;
        let mut result = ImportResult::default();

        {
            let mut stmt = tx.prepare_cached(INSERT_READING)?;
            for row in rows {
                let Some(timestamp) = row.timestamp else {
                    result.skipped += 1;
                    continue;
                };
                let changed = stmt.execute(params![
                    timestamp,
                    row.active_power_w,
                    row.import_kwh,
                    row.export_kwh
                ])?;
                if changed > 0 {
                    result.inserted += 1;
                } else {
                    result.skipped += 1;
                }
            }
        }

        tx.commit()?;
        info!(
            "Inserted {} readings ({} skipped)",
            result.inserted, result.skipped
        );
        Ok(result)
    }
}

// Read operations
impl Store {
    /// Every stored row, oldest first.
    pub fn all_readings(&self) -> Result<Vec<RawReading>> {
        self.query_readings(&ReadingQuery::new().oldest_first())
    }

    /// Query readings with filters.
    pub fn query_readings(&self, query: &ReadingQuery) -> Result<Vec<RawReading>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let readings = stmt
            .query_map(rusqlite::params_from_iter(params), raw_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Number of stored rows.
    pub fn count_readings(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Timestamps of the oldest and newest rows, `None` when empty.
    pub fn time_range(&self) -> Result<Option<TimeRange>> {
        let bounds: (Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT MIN(timestamp), MAX(timestamp) FROM readings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (Some(first), Some(last)) = bounds else {
            return Ok(None);
        };

        let convert = |secs: f64| {
            timestamp_from_unix_seconds(secs).map_err(|e| Error::InvalidTimestamp(e.to_string()))
        };
        Ok(Some(TimeRange {
            first: convert(first)?,
            last: convert(last)?,
        }))
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Map a `readings` row. SQLite does not enforce column types, so anything
/// that is not a number reads back as `None`.
fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawReading> {
    Ok(RawReading {
        timestamp: number(row, 0)?,
        active_power_w: number(row, 1)?,
        import_kwh: number(row, 2)?,
        export_kwh: number(row, 3)?,
    })
}

fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Real(v) => Some(v),
        ValueRef::Integer(v) => Some(v as f64),
        ValueRef::Text(text) => std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.trim().parse().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(ts: time::OffsetDateTime, import: f64) -> Reading {
        Reading::new(ts, 1500.0, import, 2.0)
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count_readings().unwrap(), 0);
        assert!(store.all_readings().unwrap().is_empty());
        assert!(store.time_range().unwrap().is_none());
    }

    #[test]
    fn test_insert_or_ignore() {
        let store = Store::open_in_memory().unwrap();
        let r = reading(datetime!(2024-03-01 12:00 UTC), 100.0);

        assert!(store.insert_reading(&r).unwrap());
        assert!(!store.insert_reading(&reading(r.timestamp, 999.0)).unwrap());

        let rows = store.all_readings().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].import_kwh, Some(100.0));
    }

    #[test]
    fn test_raw_power_is_stored_unscaled() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reading(&reading(datetime!(2024-03-01 12:00 UTC), 1.0))
            .unwrap();
        let latest = store.all_readings().unwrap()[0];
        assert_eq!(latest.active_power_w, Some(1500.0));
        assert_eq!(latest.timestamp, Some(1_709_294_400.0));
    }

    #[test]
    fn test_insert_readings_counts_duplicates() {
        let store = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 12:00 UTC);
        let batch = [
            reading(t0, 1.0),
            reading(t0 + time::Duration::minutes(15), 1.1),
            reading(t0, 1.0),
        ];

        let result = store.insert_readings(&batch).unwrap();
        assert_eq!(
            result,
            ImportResult {
                inserted: 2,
                skipped: 1
            }
        );

        let again = store.insert_readings(&batch).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 3);
        assert_eq!(store.count_readings().unwrap(), 2);
    }

    #[test]
    fn test_all_readings_ascending_latest_newest() {
        let store = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 12:00 UTC);
        for i in [2, 0, 1] {
            store
                .insert_reading(&reading(t0 + time::Duration::minutes(15 * i), i as f64))
                .unwrap();
        }

        let imports: Vec<_> = store
            .all_readings()
            .unwrap()
            .iter()
            .map(|r| r.import_kwh.unwrap())
            .collect();
        assert_eq!(imports, vec![0.0, 1.0, 2.0]);
        let newest = store.query_readings(&ReadingQuery::new().limit(1)).unwrap();
        assert_eq!(newest[0].import_kwh, Some(2.0));
    }

    #[test]
    fn test_query_since_with_limit() {
        let store = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 12:00 UTC);
        for i in 0..5 {
            store
                .insert_reading(&reading(t0 + time::Duration::hours(i), i as f64))
                .unwrap();
        }

        let query = ReadingQuery::new()
            .since(t0 + time::Duration::hours(2))
            .oldest_first()
            .limit(2);
        let rows = store.query_readings(&query).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].import_kwh, Some(2.0));
        assert_eq!(rows[1].import_kwh, Some(3.0));
    }

    #[test]
    fn test_time_range() {
        let store = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 12:00 UTC);
        store.insert_reading(&reading(t0, 1.0)).unwrap();
        store
            .insert_reading(&reading(t0 + time::Duration::days(2), 2.0))
            .unwrap();

        let range = store.time_range().unwrap().unwrap();
        assert_eq!(range.first, t0);
        assert_eq!(range.last, datetime!(2024-03-03 12:00 UTC));
    }

    #[test]
    fn test_untyped_columns_read_as_missing() {
        let store = Store::open_in_memory().unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO readings VALUES (1709294400.0, 'n/a', '12.5', NULL)",
                [],
            )
            .unwrap();

        let row = store.all_readings().unwrap().remove(0);
        assert_eq!(row.active_power_w, None);
        assert_eq!(row.import_kwh, Some(12.5));
        assert_eq!(row.export_kwh, None);
        assert!(row.to_reading().is_err());
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("p1_data.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .insert_reading(&reading(datetime!(2024-03-01 12:00 UTC), 1.0))
                .unwrap();
        }

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count_readings().unwrap(), 1);
    }
}
