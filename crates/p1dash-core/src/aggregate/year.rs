use std::collections::BTreeMap;

use p1dash_types::Reading;
use time::Date;

use super::{BucketMap, ChartKind, bucket_for, calendar_buckets, date_span, finish};
use crate::calendar::{Granularity, month_abbrev};
use crate::delta::{reduce_daily, round3};

/// Energy per calendar year, one bar per contributing month (`"jan"`, ...).
#[must_use]
pub fn aggregate_year(readings: &[Reading]) -> BucketMap {
    let Some((first, last)) = date_span(readings) else {
        return BucketMap::new();
    };
    let mut buckets = calendar_buckets(Granularity::Year, first, last, ChartKind::Bar);

    // (year, month) -> first day seen, import, export
    let mut months: BTreeMap<(i32, u8), (Date, f64, f64)> = BTreeMap::new();
    for day in reduce_daily(readings).values() {
        let entry = months
            .entry((day.date.year(), u8::from(day.date.month())))
            .or_insert((day.date, 0.0, 0.0));
        entry.1 += day.import;
        entry.2 += day.export;
    }

    for (date, import, export) in months.into_values() {
        let bucket = bucket_for(&mut buckets, Granularity::Year, date, ChartKind::Bar);
        bucket.push(month_abbrev(date), round3(import), round3(export));
        bucket.add_totals(import, export);
    }

    finish(buckets)
}
