//! Database schema and migrations.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Table written by the first generation of logger scripts.
const LEGACY_TABLE: &str = "metingen";

/// Initialize the database schema.
pub fn initialize(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        // Fresh database - create all tables
        create_schema_v1(conn)?;
        adopt_legacy_table(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version < SCHEMA_VERSION {
        migrate(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    if !table_exists(conn, "schema_version")? {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per meter sample, keyed by fractional unix seconds
        CREATE TABLE IF NOT EXISTS readings (
            timestamp REAL PRIMARY KEY,
            active_power_w REAL,
            total_power_import_kwh REAL,
            total_power_export_kwh REAL
        );
        "#,
    )?;

    Ok(())
}

/// Copy rows from a pre-existing logger table into `readings`.
fn adopt_legacy_table(conn: &Connection) -> Result<()> {
    if !table_exists(conn, LEGACY_TABLE)? {
        return Ok(());
    }

    let copied = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO readings
             (timestamp, active_power_w, total_power_import_kwh, total_power_export_kwh)
             SELECT timestamp, active_power_w, total_power_import_kwh, total_power_export_kwh
             FROM {LEGACY_TABLE}"
        ),
        [],
    )?;
    info!("Adopted {} rows from legacy table {}", copied, LEGACY_TABLE);
    Ok(())
}

/// Run migrations from old_version to current.
fn migrate(conn: &Connection, old_version: i32) -> Result<()> {
    // if old_version < 2 { migrate_to_v2(conn)?; }

    let _ = old_version;
    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}
