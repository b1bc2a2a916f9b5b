//! SQLite reading store for P1 smart-meter samples.
//!
//! A single append-only table of `(timestamp, active_power_w,
//! total_power_import_kwh, total_power_export_kwh)` rows, unique by
//! timestamp. Every write is insert-or-ignore, so replaying a log or running
//! two importers over the same data never duplicates a sample.
//!
//! # Features
//!
//! - Insert single samples or whole batches in one transaction
//! - Read the full table for a generation pass, or query by time range
//! - CSV export/import
//! - Adopts rows from the `metingen` table of older logger databases
//!
//! # Example
//!
//! ```no_run
//! use p1dash_store::{Store, ReadingQuery};
//!
//! let store = Store::open(p1dash_store::default_db_path())?;
//!
//! // The ten most recent samples
//! let query = ReadingQuery::new().limit(10);
//! let readings = store.query_readings(&query)?;
//! # Ok::<(), p1dash_store::Error>(())
//! ```

mod csv_io;
mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{ImportResult, TimeRange};
pub use queries::ReadingQuery;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/p1dash/p1_data.db`
/// - macOS: `~/Library/Application Support/p1dash/p1_data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\p1dash\p1_data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("p1dash")
        .join("p1_data.db")
}
