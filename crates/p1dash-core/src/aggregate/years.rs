use std::collections::BTreeMap;

use p1dash_types::Reading;

use super::{Bucket, BucketMap, ChartKind, finish};
use crate::delta::{reduce_daily, round3};

/// Number of years per multi-year bucket.
pub const CHUNK_YEARS: usize = 10;

/// Yearly energy grouped into chunks of [`CHUNK_YEARS`] years.
///
/// Chunks are cut by position in the sorted list of years that hold data, so
/// `{2010, 2012, 2015, 2021}` is one chunk `"2010-2021"`. Years without data
/// are neither listed nor gap-filled.
#[must_use]
pub fn aggregate_years(readings: &[Reading]) -> BucketMap {
    let mut totals: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for day in reduce_daily(readings).values() {
        let entry = totals.entry(day.date.year()).or_insert((0.0, 0.0));
        entry.0 += day.import;
        entry.1 += day.export;
    }

    let years: Vec<_> = totals.into_iter().collect();
    let mut buckets = BucketMap::new();

    for chunk in years.chunks(CHUNK_YEARS) {
        let (Some((first, _)), Some((last, _))) = (chunk.first(), chunk.last()) else {
            continue;
        };
        let mut bucket = Bucket::titled(format!("Jaren {first} t/m {last}"), ChartKind::Bar);
        for (year, (import, export)) in chunk {
            bucket.push(year.to_string(), round3(*import), round3(*export));
            bucket.add_totals(*import, *export);
        }
        buckets.insert(format!("{first}-{last}"), bucket);
    }

    finish(buckets)
}
