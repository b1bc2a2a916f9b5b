//! Counter deltas and the per-day reduction shared by the rollup views.
//!
//! Two policies apply to a negative delta (meter reset or rollover):
//!
//! - **Clamp** ([`Delta::clamped`]): the day view shows it as zero.
//! - **Skip** ([`valid_deltas`]): multi-day rollups drop the whole reading pair,
//!   import and export alike, so the corrupt transition contributes nothing.
//!
//! The totals of the two families of views depend on this split; do not
//! unify them.

use std::collections::BTreeMap;

use p1dash_types::Reading;
use time::Date;

/// Energy moved between two readings, in kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub import: f64,
    pub export: f64,
}

impl Delta {
    /// Difference of the cumulative counters, `cur - prev`.
    #[must_use]
    pub fn between(prev: &Reading, cur: &Reading) -> Self {
        Self {
            import: cur.import_kwh - prev.import_kwh,
            export: cur.export_kwh - prev.export_kwh,
        }
    }

    /// Both sides with negatives replaced by zero.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            import: self.import.max(0.0),
            export: self.export.max(0.0),
        }
    }

    /// True when neither counter went backwards.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        !(self.import < 0.0 || self.export < 0.0)
    }
}

/// Deltas of consecutive reading pairs, skipping pairs where either counter
/// decreased. Each item is paired with the later reading of its pair.
pub fn valid_deltas(readings: &[Reading]) -> impl Iterator<Item = (&Reading, Delta)> {
    readings.windows(2).filter_map(|pair| {
        let delta = Delta::between(&pair[0], &pair[1]);
        delta.is_monotonic().then_some((&pair[1], delta))
    })
}

/// Energy attributed to one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotal {
    pub date: Date,
    pub import: f64,
    pub export: f64,
    /// Number of reading pairs that contributed.
    pub samples: u32,
}

/// Sum the valid deltas per local calendar day of the later reading.
///
/// Only days with at least one contributing pair are present.
#[must_use]
pub fn reduce_daily(readings: &[Reading]) -> BTreeMap<Date, DailyTotal> {
    let mut days: BTreeMap<Date, DailyTotal> = BTreeMap::new();

    for (reading, delta) in valid_deltas(readings) {
        let date = reading.timestamp.date();
        let total = days.entry(date).or_insert(DailyTotal {
            date,
            import: 0.0,
            export: 0.0,
            samples: 0,
        });
        total.import += delta.import;
        total.export += delta.export;
        total.samples += 1;
    }

    days
}

/// Round to three decimals (Wh precision on kWh values).
///
/// Rounds the exact binary value through its decimal representation.
/// `1.0005` is stored just below the midpoint and becomes `1.0`, not `1.001`.
#[must_use]
pub fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}
