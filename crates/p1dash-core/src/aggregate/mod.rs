//! Time-bucketed aggregation of meter readings.
//!
//! Every view is a pure function of the full, ascending reading sequence and is
//! rebuilt from scratch on each pass:
//!
//! | View | Key | Series entry | Chart |
//! |------|-----|--------------|-------|
//! | [`aggregate_day`] | `YYYY-MM-DD` | one per reading, W-equivalent rate | line |
//! | [`aggregate_week`] | `YYYY-WW` (ISO) | one per contributing day, kWh | bar |
//! | [`aggregate_month`] | `YYYY-MM` | one per contributing ISO week, kWh | bar |
//! | [`aggregate_year`] | `YYYY` | one per contributing month, kWh | bar |
//! | [`aggregate_years`] | `first-last` | one per year, chunks of ten | bar |
//!
//! Day, week, month and year maps contain a bucket for every calendar unit
//! between the first and the last reading, including units without data.
//!
//! # Example
//!
//! ```
//! use p1dash_core::aggregate::Periods;
//! use p1dash_types::Reading;
//! use time::macros::datetime;
//!
//! let readings = vec![
//!     Reading::new(datetime!(2024-05-01 10:00 +02:00), 300.0, 100.0, 10.0),
//!     Reading::new(datetime!(2024-05-03 10:00 +02:00), 300.0, 104.0, 12.0),
//! ];
//! let periods = Periods::compute(&readings)?;
//! assert_eq!(periods.day.len(), 3);
//! assert_eq!(periods.year["2024"].total_import, 4.0);
//! # Ok::<(), p1dash_core::Error>(())
//! ```

mod day;
mod month;
mod week;
mod year;
mod years;

use std::collections::BTreeMap;

use p1dash_types::Reading;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::calendar::{Granularity, days};
use crate::delta::round3;
use crate::error::{Error, Result};

pub use day::{SLOT_HOURS, aggregate_day};
pub use month::aggregate_month;
pub use week::aggregate_week;
pub use year::aggregate_year;
pub use years::{CHUNK_YEARS, aggregate_years};

/// How the presentation layer should plot a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One aggregation window.
///
/// `labels`, `imports` and `exports` always have the same length. A bucket
/// without data keeps its title and has empty series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub title: String,
    pub labels: Vec<String>,
    pub imports: Vec<f64>,
    pub exports: Vec<f64>,
    pub total_import: f64,
    pub total_export: f64,
    #[serde(rename = "type")]
    pub chart_kind: ChartKind,
}

impl Bucket {
    /// An empty bucket with only its title set.
    pub fn titled(title: impl Into<String>, chart_kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            labels: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            total_import: 0.0,
            total_export: 0.0,
            chart_kind,
        }
    }

    /// Append one series entry.
    pub fn push(&mut self, label: impl Into<String>, import: f64, export: f64) {
        self.labels.push(label.into());
        self.imports.push(import);
        self.exports.push(export);
    }

    /// Accumulate into the unrounded totals.
    pub fn add_totals(&mut self, import: f64, export: f64) {
        self.total_import += import;
        self.total_export += export;
    }

    fn round_totals(&mut self) {
        self.total_import = round3(self.total_import);
        self.total_export = round3(self.total_export);
    }

    /// True when no data reduced into this bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Bucket key to bucket, ordered by key. All keys sort chronologically.
pub type BucketMap = BTreeMap<String, Bucket>;

/// The five views of one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periods {
    pub day: BucketMap,
    pub week: BucketMap,
    pub month: BucketMap,
    pub year: BucketMap,
    pub years: BucketMap,
}

impl Periods {
    /// Run every aggregation over `readings`.
    ///
    /// # Errors
    ///
    /// [`Error::NoData`] when `readings` is empty.
    pub fn compute(readings: &[Reading]) -> Result<Self> {
        if readings.is_empty() {
            return Err(Error::NoData);
        }

        Ok(Self {
            day: aggregate_day(readings),
            week: aggregate_week(readings),
            month: aggregate_month(readings),
            year: aggregate_year(readings),
            years: aggregate_years(readings),
        })
    }
}

/// Local dates of the first and last reading.
fn date_span(readings: &[Reading]) -> Option<(Date, Date)> {
    let first = readings.first()?.timestamp.date();
    let last = readings.last()?.timestamp.date();
    Some((first, last))
}

/// Pre-create a titled, empty bucket for every `granularity` unit touched by
/// the day walk from `first` to `last`.
fn calendar_buckets(granularity: Granularity, first: Date, last: Date, kind: ChartKind) -> BucketMap {
    let mut buckets = BucketMap::new();
    for date in days(first, last) {
        buckets
            .entry(granularity.key(date))
            .or_insert_with(|| Bucket::titled(granularity.title(date), kind));
    }
    buckets
}

/// Get-or-create the bucket for `date`.
fn bucket_for(buckets: &mut BucketMap, granularity: Granularity, date: Date, kind: ChartKind) -> &mut Bucket {
    buckets
        .entry(granularity.key(date))
        .or_insert_with(|| Bucket::titled(granularity.title(date), kind))
}

fn finish(mut buckets: BucketMap) -> BucketMap {
    for bucket in buckets.values_mut() {
        bucket.round_totals();
    }
    buckets
}
