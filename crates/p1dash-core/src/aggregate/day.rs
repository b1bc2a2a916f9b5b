use p1dash_types::Reading;

use super::{Bucket, BucketMap, ChartKind, bucket_for, calendar_buckets, date_span, finish};
use crate::calendar::{Granularity, clock_label};
use crate::delta::Delta;

/// Length of the nominal sampling slot the day series is normalised to.
pub const SLOT_HOURS: f64 = 0.25;

/// Energy over one slot, in kWh, as an average power in watts.
fn slot_rate(kwh: f64) -> f64 {
    kwh * 1000.0 / SLOT_HOURS
}

/// Per-reading power series for every local calendar day.
///
/// The first reading of a day is its own baseline and plots as zero; every
/// later reading plots the delta to the reading before it in the same day,
/// clamped at zero. Totals accumulate the clamped deltas in kWh.
#[must_use]
pub fn aggregate_day(readings: &[Reading]) -> BucketMap {
    let Some((first, last)) = date_span(readings) else {
        return BucketMap::new();
    };
    let mut buckets = calendar_buckets(Granularity::Day, first, last, ChartKind::Line);

    for day in readings.chunk_by(|a, b| a.timestamp.date() == b.timestamp.date()) {
        let bucket = bucket_for(&mut buckets, Granularity::Day, day[0].timestamp.date(), ChartKind::Line);
        let mut prev = &day[0];
        for reading in day {
            let delta = Delta::between(prev, reading).clamped();
            push_sample(bucket, reading, delta);
            prev = reading;
        }
    }

    finish(buckets)
}

fn push_sample(bucket: &mut Bucket, reading: &Reading, delta: Delta) {
    bucket.push(
        clock_label(reading.timestamp.time()),
        slot_rate(delta.import),
        slot_rate(delta.export),
    );
    bucket.add_totals(delta.import, delta.export);
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_quarter_hour_rates_with_reset() {
        let readings = [
            Reading::new(datetime!(2024-03-05 10:00 +01:00), 0.0, 1.000, 0.0),
            Reading::new(datetime!(2024-03-05 10:15 +01:00), 0.0, 1.010, 0.0),
            Reading::new(datetime!(2024-03-05 10:30 +01:00), 0.0, 1.022, 0.0),
            Reading::new(datetime!(2024-03-05 10:45 +01:00), 0.0, 1.020, 0.0),
        ];

        let days = aggregate_day(&readings);
        let bucket = &days["2024-03-05"];
        assert_eq!(bucket.title, "di 5 mrt 2024");
        assert_eq!(bucket.chart_kind, ChartKind::Line);
        assert_eq!(bucket.labels, vec!["10:00", "10:15", "10:30", "10:45"]);

        let expected = [0.0, 40.0, 48.0, 0.0];
        for (got, want) in bucket.imports.iter().zip(expected) {
            assert!(approx(*got, want), "{got} != {want}");
        }
        assert_eq!(bucket.imports[3], 0.0);
        assert_eq!(bucket.total_import, 0.022);
        assert_eq!(bucket.total_export, 0.0);
    }

    #[test]
    fn test_first_reading_of_each_day_is_baseline() {
        let readings = [
            Reading::new(datetime!(2024-03-05 23:45 UTC), 0.0, 10.0, 0.0),
            Reading::new(datetime!(2024-03-06 00:00 UTC), 0.0, 10.5, 0.0),
            Reading::new(datetime!(2024-03-06 00:15 UTC), 0.0, 10.75, 0.0),
        ];

        let days = aggregate_day(&readings);
        assert_eq!(days["2024-03-05"].imports, vec![0.0]);
        assert_eq!(days["2024-03-06"].imports, vec![0.0, 1000.0]);
        assert_eq!(days["2024-03-06"].total_import, 0.25);
    }

    #[test]
    fn test_missing_days_get_titled_empty_buckets() {
        let readings = [
            Reading::new(datetime!(2024-02-28 12:00 UTC), 0.0, 1.0, 0.0),
            Reading::new(datetime!(2024-03-01 12:00 UTC), 0.0, 2.0, 0.0),
        ];

        let days = aggregate_day(&readings);
        let keys: Vec<_> = days.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-02-28", "2024-02-29", "2024-03-01"]);

        let gap = &days["2024-02-29"];
        assert_eq!(gap.title, "do 29 feb 2024");
        assert!(gap.is_empty());
        assert_eq!(gap.total_import, 0.0);
    }

    #[test]
    fn test_export_series_tracks_export_counter() {
        let readings = [
            Reading::new(datetime!(2024-06-21 13:00 +02:00), -1500.0, 5.0, 20.0),
            Reading::new(datetime!(2024-06-21 13:15 +02:00), -1500.0, 5.0, 20.375),
        ];
        let bucket = &aggregate_day(&readings)["2024-06-21"];
        assert_eq!(bucket.exports, vec![0.0, 1500.0]);
        assert_eq!(bucket.total_export, 0.375);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_day(&[]).is_empty());
    }
}
