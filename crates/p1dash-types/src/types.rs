//! Core types for P1 meter data.

use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// A single meter sample.
///
/// `import_kwh` and `export_kwh` are the lifetime counters of the meter. They only
/// grow, except when the meter is replaced or its registers roll over.
///
/// `timestamp` carries the UTC offset that was in effect at the meter's location
/// for that instant, so `timestamp.date()` and `timestamp.time()` are local
/// calendar values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the sample was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Net active power in watts; negative while exporting.
    pub active_power_w: f64,
    /// Cumulative imported energy in kWh.
    pub import_kwh: f64,
    /// Cumulative exported energy in kWh.
    pub export_kwh: f64,
}

impl Reading {
    /// Create a reading from its four fields.
    pub fn new(timestamp: OffsetDateTime, active_power_w: f64, import_kwh: f64, export_kwh: f64) -> Self {
        Self {
            timestamp,
            active_power_w,
            import_kwh,
            export_kwh,
        }
    }

    /// Whether the household was exporting at this instant.
    #[must_use]
    pub fn is_export(&self) -> bool {
        self.active_power_w < 0.0
    }

    /// Timestamp as fractional unix seconds (the storage key).
    #[must_use]
    pub fn unix_seconds(&self) -> f64 {
        self.timestamp.unix_timestamp() as f64 + f64::from(self.timestamp.nanosecond()) / 1e9
    }
}

/// A reading row as it sits in the store, before validation.
///
/// SQLite does not enforce column types, so every field may come back empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawReading {
    /// Fractional unix seconds.
    pub timestamp: Option<f64>,
    /// Active power as reported by the device.
    pub active_power_w: Option<f64>,
    /// Cumulative import counter.
    pub import_kwh: Option<f64>,
    /// Cumulative export counter.
    pub export_kwh: Option<f64>,
}

impl RawReading {
    /// Check every field and convert to a UTC [`Reading`].
    ///
    /// Power is passed through unscaled.
    pub fn to_reading(&self) -> ParseResult<Reading> {
        let secs = self.timestamp.ok_or(ParseError::MissingField("timestamp"))?;
        let active_power_w = self
            .active_power_w
            .ok_or(ParseError::MissingField("active_power_w"))?;
        let import_kwh = self
            .import_kwh
            .ok_or(ParseError::MissingField("total_power_import_kwh"))?;
        let export_kwh = self
            .export_kwh
            .ok_or(ParseError::MissingField("total_power_export_kwh"))?;

        Ok(Reading {
            timestamp: timestamp_from_unix_seconds(secs)?,
            active_power_w,
            import_kwh,
            export_kwh,
        })
    }
}

impl From<&Reading> for RawReading {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: Some(reading.unix_seconds()),
            active_power_w: Some(reading.active_power_w),
            import_kwh: Some(reading.import_kwh),
            export_kwh: Some(reading.export_kwh),
        }
    }
}

/// Convert fractional unix seconds to a UTC instant.
pub fn timestamp_from_unix_seconds(secs: f64) -> ParseResult<OffsetDateTime> {
    if !secs.is_finite() {
        return Err(ParseError::InvalidTimestamp(secs.to_string()));
    }
    let whole = secs.floor();
    let nanos = (whole as i128) * 1_000_000_000 + ((secs - whole) * 1e9).round() as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| ParseError::InvalidTimestamp(format!("{secs}: {e}")))
}

/// Body of the meter's `GET /api/v1/data` response.
///
/// Only the fields the dashboard needs are modelled; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeterData {
    /// Net active power in watts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_power_w: Option<f64>,
    /// Cumulative imported energy in kWh.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_power_import_kwh: Option<f64>,
    /// Cumulative exported energy in kWh.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_power_export_kwh: Option<f64>,
    /// Smart meter model string.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub meter_model: Option<String>,
    /// Wi-Fi signal strength in percent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub wifi_strength: Option<f64>,
}

impl MeterData {
    /// Build a reading stamped with `timestamp`.
    ///
    /// Missing power counts as zero; missing counters make the sample unusable.
    pub fn to_reading(&self, timestamp: OffsetDateTime) -> ParseResult<Reading> {
        let import_kwh = self
            .total_power_import_kwh
            .ok_or(ParseError::MissingField("total_power_import_kwh"))?;
        let export_kwh = self
            .total_power_export_kwh
            .ok_or(ParseError::MissingField("total_power_export_kwh"))?;

        Ok(Reading {
            timestamp,
            active_power_w: self.active_power_w.unwrap_or(0.0),
            import_kwh,
            export_kwh,
        })
    }
}
