use std::collections::BTreeMap;

use p1dash_types::Reading;
use time::Date;

use super::{BucketMap, ChartKind, bucket_for, calendar_buckets, date_span, finish};
use crate::calendar::{Granularity, month_number};
use crate::delta::{DailyTotal, reduce_daily, round3};

/// Contributing days of one ISO week.
struct WeekSpan {
    week: u8,
    start: Date,
    end: Date,
    import: f64,
    export: f64,
}

impl WeekSpan {
    fn open(day: &DailyTotal) -> Self {
        let (_, week, _) = day.date.to_iso_week_date();
        Self {
            week,
            start: day.date,
            end: day.date,
            import: 0.0,
            export: 0.0,
        }
    }

    fn add(&mut self, day: &DailyTotal) {
        self.start = self.start.min(day.date);
        self.end = self.end.max(day.date);
        self.import += day.import;
        self.export += day.export;
    }

    /// `W10 (4-3 t/m 8-3)`
    fn label(&self) -> String {
        format!(
            "W{:02} ({}-{} t/m {}-{})",
            self.week,
            self.start.day(),
            month_number(self.start),
            self.end.day(),
            month_number(self.end)
        )
    }
}

/// Energy per month, one bar per ISO week that has contributing days.
///
/// A week straddling two months is listed once, under the month of its first
/// contributing day.
#[must_use]
pub fn aggregate_month(readings: &[Reading]) -> BucketMap {
    let Some((first, last)) = date_span(readings) else {
        return BucketMap::new();
    };
    let mut buckets = calendar_buckets(Granularity::Month, first, last, ChartKind::Bar);

    let mut weeks: BTreeMap<String, WeekSpan> = BTreeMap::new();
    for day in reduce_daily(readings).values() {
        weeks
            .entry(Granularity::Week.key(day.date))
            .or_insert_with(|| WeekSpan::open(day))
            .add(day);
    }

    for span in weeks.values() {
        let bucket = bucket_for(&mut buckets, Granularity::Month, span.start, ChartKind::Bar);
        bucket.push(span.label(), round3(span.import), round3(span.export));
        bucket.add_totals(span.import, span.export);
    }

    finish(buckets)
}
