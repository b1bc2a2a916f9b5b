//! Reading loader: stored rows and raw JSONL logs to sorted, localised readings.
//!
//! Every [`Reading`] leaving this module carries the UTC offset of the
//! configured zone at its instant, so calendar keys downstream are local.

use std::collections::HashSet;
use std::io::BufRead;

use chrono::{NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use p1dash_types::{MeterData, ParseError, ParseResult, RawReading, Reading};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default zone for calendar bucketing.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

/// The device reports active power in tenths of a watt.
pub const DEFAULT_POWER_DIVISOR: f64 = 10.0;

/// How stored rows are turned into readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderOptions {
    /// Zone whose local calendar defines day, week, month and year buckets.
    pub timezone: Tz,
    /// Stored power is divided by this before display.
    pub power_divisor: f64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            power_divisor: DEFAULT_POWER_DIVISOR,
        }
    }
}

impl LoaderOptions {
    /// Build options from an IANA zone name.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTimezone`] for an unknown zone and
    /// [`Error::InvalidConfig`] for a divisor that is not a positive number.
    pub fn new(timezone: &str, power_divisor: f64) -> Result<Self> {
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|_| Error::InvalidTimezone(timezone.to_string()))?;
        if !(power_divisor.is_finite() && power_divisor > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "power_divisor must be positive, got {power_divisor}"
            )));
        }
        Ok(Self {
            timezone,
            power_divisor,
        })
    }

    /// UTC offset of the configured zone at `instant`.
    #[must_use]
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        let Some(utc) = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0) else {
            return UtcOffset::UTC;
        };
        let seconds = self
            .timezone
            .offset_from_utc_datetime(&utc.naive_utc())
            .fix()
            .local_minus_utc();
        UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
    }

    /// The same instant expressed in local time.
    #[must_use]
    pub fn localize(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }

    /// Interpret a wall-clock time in the configured zone.
    ///
    /// During the autumn overlap the earlier instant wins; times inside the
    /// spring gap do not exist and are rejected.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> ParseResult<OffsetDateTime> {
        let local = self
            .timezone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| ParseError::InvalidTimestamp(format!("{naive} does not exist in {}", self.timezone)))?;
        let nanos = i128::from(local.timestamp()) * 1_000_000_000 + i128::from(local.timestamp_subsec_nanos());
        let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|e| ParseError::InvalidTimestamp(format!("{naive}: {e}")))?;
        Ok(self.localize(utc))
    }

    /// Localise a UTC reading and scale its power for display.
    #[must_use]
    pub fn prepare(&self, reading: Reading) -> Reading {
        Reading {
            timestamp: self.localize(reading.timestamp),
            active_power_w: reading.active_power_w / self.power_divisor,
            ..reading
        }
    }
}

/// Convert stored rows into the sorted reading sequence the engine expects.
///
/// Rows with a missing field are dropped with a warning. Power is divided by
/// [`LoaderOptions::power_divisor`]. Of several rows with the same timestamp the
/// first one is kept.
///
/// # Errors
///
/// [`Error::NoData`] when no usable row remains.
pub fn load(rows: &[RawReading], options: &LoaderOptions) -> Result<Vec<Reading>> {
    let mut readings: Vec<Reading> = rows
        .iter()
        .filter_map(|row| match row.to_reading() {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("Dropping stored reading {:?}: {}", row.timestamp, e);
                None
            }
        })
        .map(|reading| options.prepare(reading))
        .collect();

    readings.sort_by_key(|r| r.timestamp);
    readings.dedup_by_key(|r| r.timestamp);

    if readings.is_empty() {
        return Err(Error::NoData);
    }

    debug!("Loaded {} of {} stored readings", readings.len(), rows.len());
    Ok(readings)
}

/// The first usable row of a newest-first page, prepared for display.
///
/// Malformed rows are skipped, so a broken newest row does not hide the valid
/// one behind it.
pub fn first_valid(rows: &[RawReading], options: &LoaderOptions) -> Option<Reading> {
    rows.iter().find_map(|row| match row.to_reading() {
        Ok(reading) => Some(options.prepare(reading)),
        Err(e) => {
            debug!("Skipping stored reading {:?}: {}", row.timestamp, e);
            None
        }
    })
}

/// One line of a raw meter log.
#[derive(Debug, Deserialize)]
struct LogRecord {
    timestamp: Option<String>,
    data: Option<MeterData>,
}

/// Parse one JSONL log record: `{"timestamp": "...", "data": {...}}`.
///
/// A timestamp with an offset is taken as is; one without is read as local
/// time in the configured zone. Power is kept as reported by the device.
pub fn parse_log_line(line: &str, options: &LoaderOptions) -> ParseResult<Reading> {
    let record: LogRecord =
        serde_json::from_str(line).map_err(|e| ParseError::InvalidData(e.to_string()))?;
    let stamp = record
        .timestamp
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField("timestamp"))?;
    let data = record.data.ok_or(ParseError::MissingField("data"))?;

    let timestamp = parse_timestamp(&stamp, options)?;
    data.to_reading(timestamp)
}

fn parse_timestamp(stamp: &str, options: &LoaderOptions) -> ParseResult<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(stamp, &Rfc3339) {
        return Ok(options.localize(instant));
    }

    let naive = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| ParseError::InvalidTimestamp(format!("{stamp}: {e}")))?;
    options.resolve_local(naive)
}

/// Counters for one pass over a raw log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Non-blank lines read.
    pub lines: usize,
    /// Lines that produced a reading.
    pub parsed: usize,
    /// Lines that could not be parsed.
    pub skipped: usize,
    /// Parsed readings dropped as exact repeats.
    pub duplicates: usize,
}

impl LogStats {
    /// Fold another file's counters into this one.
    pub fn merge(&mut self, other: LogStats) {
        self.lines += other.lines;
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.duplicates += other.duplicates;
    }
}

/// Read a JSONL log into ascending readings.
///
/// Bad lines are skipped with a warning. Readings repeating an earlier
/// `(timestamp, import, export)` triple are dropped.
///
/// # Errors
///
/// Only I/O failures of `reader` abort the pass.
pub fn load_log<R: BufRead>(reader: R, options: &LoaderOptions) -> Result<(Vec<Reading>, LogStats)> {
    let mut stats = LogStats::default();
    let mut seen = HashSet::new();
    let mut readings = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        let reading = match parse_log_line(line, options) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Skipping log line {}: {}", index + 1, e);
                stats.skipped += 1;
                continue;
            }
        };
        stats.parsed += 1;

        let key = (
            reading.timestamp.unix_timestamp_nanos(),
            reading.import_kwh.to_bits(),
            reading.export_kwh.to_bits(),
        );
        if seen.insert(key) {
            readings.push(reading);
        } else {
            stats.duplicates += 1;
        }
    }

    readings.sort_by_key(|r| r.timestamp);
    Ok((readings, stats))
}
