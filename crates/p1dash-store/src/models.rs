//! Data models for store results.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Outcome of a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Rows written.
    pub inserted: usize,
    /// Rows ignored: duplicate timestamps or unusable records.
    pub skipped: usize,
}

impl ImportResult {
    /// Rows looked at.
    pub fn total(&self) -> usize {
        self.inserted + self.skipped
    }

    /// Add another batch's counters to this one.
    pub fn merge(&mut self, other: ImportResult) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
    }
}

/// First and last stored sample, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "time::serde::rfc3339")]
    pub first: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last: OffsetDateTime,
}

impl TimeRange {
    /// Time covered by the store.
    pub fn span(&self) -> time::Duration {
        self.last - self.first
    }
}
