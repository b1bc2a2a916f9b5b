//! The snapshot handed to the renderer and the JSON API.

use p1dash_types::Reading;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::aggregate::Periods;
use crate::delta::round3;
use crate::error::{Error, Result};

/// The newest sample, shown in the "now" panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Local time as `YYYY-MM-DD HH:MM`.
    pub label: String,
    pub active_w: f64,
    pub is_export: bool,
    pub import_kwh: f64,
    pub export_kwh: f64,
}

impl From<&Reading> for LatestReading {
    fn from(reading: &Reading) -> Self {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        Self {
            timestamp: reading.timestamp,
            label: reading.timestamp.format(format).unwrap_or_default(),
            active_w: reading.active_power_w,
            is_export: reading.is_export(),
            import_kwh: round3(reading.import_kwh),
            export_kwh: round3(reading.export_kwh),
        }
    }
}

/// Everything one generation pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub latest: LatestReading,
    pub periods: Periods,
}

impl Dashboard {
    /// Aggregate `readings` (ascending, localised) into a snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::NoData`] when `readings` is empty.
    pub fn build(readings: &[Reading], generated_at: OffsetDateTime) -> Result<Self> {
        let latest = readings.last().ok_or(Error::NoData)?;
        Ok(Self {
            generated_at,
            latest: LatestReading::from(latest),
            periods: Periods::compute(readings)?,
        })
    }

    /// Snapshot as a JSON string, as embedded in the page.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
