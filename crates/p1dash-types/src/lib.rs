//! Platform-agnostic types for P1 smart-meter readings.
//!
//! This crate provides the shared data shapes used by the store, the
//! aggregation engine and the HTTP service.
//!
//! # Features
//!
//! - [`Reading`]: one validated meter sample
//! - [`RawReading`]: a stored row that has not been validated yet
//! - [`MeterData`]: the JSON body returned by the meter
//! - Error types for data parsing
//!
//! # Example
//!
//! ```
//! use p1dash_types::{MeterData, Reading};
//! use time::OffsetDateTime;
//!
//! let data = MeterData {
//!     active_power_w: Some(-350.0),
//!     total_power_import_kwh: Some(1234.5),
//!     total_power_export_kwh: Some(321.0),
//!     ..Default::default()
//! };
//! let reading = data.to_reading(OffsetDateTime::UNIX_EPOCH)?;
//! assert!(reading.is_export());
//! # Ok::<(), p1dash_types::ParseError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{MeterData, RawReading, Reading, timestamp_from_unix_seconds};

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // --- RawReading validation ---

    #[test]
    fn test_raw_reading_complete_row_converts() {
        let raw = RawReading {
            timestamp: Some(1_700_000_000.0),
            active_power_w: Some(4500.0),
            import_kwh: Some(100.25),
            export_kwh: Some(20.5),
        };

        let reading = raw.to_reading().unwrap();
        assert_eq!(reading.timestamp.unix_timestamp(), 1_700_000_000);
        assert_eq!(reading.active_power_w, 4500.0);
        assert_eq!(reading.import_kwh, 100.25);
        assert_eq!(reading.export_kwh, 20.5);
    }

    #[test]
    fn test_raw_reading_fractional_seconds_preserved() {
        let raw = RawReading {
            timestamp: Some(1_700_000_000.5),
            active_power_w: Some(0.0),
            import_kwh: Some(1.0),
            export_kwh: Some(1.0),
        };

        let reading = raw.to_reading().unwrap();
        assert_eq!(reading.timestamp.millisecond(), 500);
        assert!((reading.unix_seconds() - 1_700_000_000.5).abs() < 1e-6);
    }

    #[test]
    fn test_raw_reading_missing_fields() {
        let full = RawReading {
            timestamp: Some(1.0),
            active_power_w: Some(1.0),
            import_kwh: Some(1.0),
            export_kwh: Some(1.0),
        };

        let raw = RawReading {
            timestamp: None,
            ..full
        };
        assert_eq!(raw.to_reading(), Err(ParseError::MissingField("timestamp")));

        let raw = RawReading {
            active_power_w: None,
            ..full
        };
        assert_eq!(
            raw.to_reading(),
            Err(ParseError::MissingField("active_power_w"))
        );

        let raw = RawReading {
            import_kwh: None,
            ..full
        };
        assert_eq!(
            raw.to_reading(),
            Err(ParseError::MissingField("total_power_import_kwh"))
        );

        let raw = RawReading {
            export_kwh: None,
            ..full
        };
        assert_eq!(
            raw.to_reading(),
            Err(ParseError::MissingField("total_power_export_kwh"))
        );
    }

    #[test]
    fn test_raw_reading_non_finite_timestamp() {
        let raw = RawReading {
            timestamp: Some(f64::NAN),
            active_power_w: Some(1.0),
            import_kwh: Some(1.0),
            export_kwh: Some(1.0),
        };
        assert!(matches!(
            raw.to_reading(),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_raw_reading_from_reading_round_trip_key() {
        let reading = Reading::new(datetime!(2024-03-01 12:00:00 UTC), 0.0, 5.0, 2.0);

        let raw = RawReading::from(&reading);
        assert_eq!(raw.timestamp, Some(1_709_294_400.0));
        assert_eq!(raw.to_reading().unwrap(), reading);
    }

    // --- MeterData ---

    #[test]
    fn test_meter_data_deserialize_device_response() {
        let json = r#"{
            "wifi_ssid": "home",
            "wifi_strength": 84,
            "meter_model": "ISKRA 2M550T-101",
            "active_power_w": 412,
            "total_power_import_kwh": 10830.511,
            "total_power_export_kwh": 1969.745,
            "active_power_l1_w": 412
        }"#;

        let data: MeterData = serde_json::from_str(json).unwrap();
        assert_eq!(data.active_power_w, Some(412.0));
        assert_eq!(data.total_power_import_kwh, Some(10830.511));
        assert_eq!(data.total_power_export_kwh, Some(1969.745));
        assert_eq!(data.meter_model.as_deref(), Some("ISKRA 2M550T-101"));
    }

    #[test]
    fn test_meter_data_missing_power_defaults_to_zero() {
        let data: MeterData =
            serde_json::from_str(r#"{"total_power_import_kwh": 1.0, "total_power_export_kwh": 2.0}"#)
                .unwrap();

        let reading = data.to_reading(time::OffsetDateTime::UNIX_EPOCH).unwrap();
        assert_eq!(reading.active_power_w, 0.0);
        assert!(!reading.is_export());
    }

    #[test]
    fn test_meter_data_missing_counter_is_error() {
        let data: MeterData = serde_json::from_str(r#"{"active_power_w": 5}"#).unwrap();
        assert_eq!(
            data.to_reading(time::OffsetDateTime::UNIX_EPOCH),
            Err(ParseError::MissingField("total_power_import_kwh"))
        );
    }

    #[test]
    fn test_reading_serializes_rfc3339() {
        let reading = Reading::new(datetime!(2024-06-01 08:15:00 +02:00), -120.0, 1.5, 2.5);
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["timestamp"], "2024-06-01T08:15:00+02:00");
        assert_eq!(json["active_power_w"], -120.0);
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseError::MissingField("timestamp").to_string(),
            "Missing required field: timestamp"
        );
    }

    mod proptests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whole-second keys survive the f64 storage representation.
            #[test]
            fn unix_seconds_round_trip(secs in 0i64..4_102_444_800) {
                let ts = timestamp_from_unix_seconds(secs as f64).unwrap();
                prop_assert_eq!(ts.unix_timestamp(), secs);
            }
        }
    }
}
