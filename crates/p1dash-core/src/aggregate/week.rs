use p1dash_types::Reading;

use super::{BucketMap, ChartKind, bucket_for, calendar_buckets, date_span, finish};
use crate::calendar::{Granularity, month_number, weekday_abbrev};
use crate::delta::{reduce_daily, round3};

/// Daily energy per ISO week, one bar per contributing day (`"ma 4/3"`).
#[must_use]
pub fn aggregate_week(readings: &[Reading]) -> BucketMap {
    let Some((first, last)) = date_span(readings) else {
        return BucketMap::new();
    };
    let mut buckets = calendar_buckets(Granularity::Week, first, last, ChartKind::Bar);

    for day in reduce_daily(readings).into_values() {
        let label = format!(
            "{} {}/{}",
            weekday_abbrev(day.date),
            day.date.day(),
            month_number(day.date)
        );
        let bucket = bucket_for(&mut buckets, Granularity::Week, day.date, ChartKind::Bar);
        bucket.push(label, round3(day.import), round3(day.export));
        bucket.add_totals(day.import, day.export);
    }

    finish(buckets)
}
