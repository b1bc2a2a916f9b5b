//! CSV export and import of the readings table.
//!
//! The column names match the table, so a file written by
//! [`Store::export_csv`] can be fed back through [`Store::import_csv`] or
//! opened in a spreadsheet as is.

use std::io::{Read, Write};

use p1dash_types::RawReading;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::models::ImportResult;
use crate::store::Store;

/// One CSV row.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    timestamp: Option<f64>,
    active_power_w: Option<f64>,
    total_power_import_kwh: Option<f64>,
    total_power_export_kwh: Option<f64>,
}

impl From<&RawReading> for CsvRecord {
    fn from(raw: &RawReading) -> Self {
        Self {
            timestamp: raw.timestamp,
            active_power_w: raw.active_power_w,
            total_power_import_kwh: raw.import_kwh,
            total_power_export_kwh: raw.export_kwh,
        }
    }
}

impl From<CsvRecord> for RawReading {
    fn from(record: CsvRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            active_power_w: record.active_power_w,
            import_kwh: record.total_power_import_kwh,
            export_kwh: record.total_power_export_kwh,
        }
    }
}

impl Store {
    /// Write every stored row, oldest first, with a header line.
    ///
    /// Returns the number of rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rows = self.all_readings()?;
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &rows {
            wtr.serialize(CsvRecord::from(row))?;
        }
        wtr.flush()?;
        Ok(rows.len())
    }

    /// Insert rows from a CSV file with the export header.
    ///
    /// Unreadable records and records missing a counter are skipped, as are
    /// timestamps already stored.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportResult> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        let mut unusable = 0;

        for (index, record) in rdr.deserialize::<CsvRecord>().enumerate() {
            let raw = match record {
                Ok(record) => RawReading::from(record),
                Err(e) => {
                    warn!("Skipping CSV record {}: {}", index + 1, e);
                    unusable += 1;
                    continue;
                }
            };
            if let Err(e) = raw.to_reading() {
                warn!("Skipping CSV record {}: {}", index + 1, e);
                unusable += 1;
                continue;
            }
            rows.push(raw);
        }

        let mut result = self.insert_raw(&rows)?;
        result.skipped += unusable;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p1dash_types::Reading;
    use time::macros::datetime;

    #[test]
    fn test_export_header_and_rows() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_reading(&Reading::new(datetime!(2024-03-01 12:00 UTC), 1500.0, 10.5, 2.25))
            .unwrap();

        let mut out = Vec::new();
        assert_eq!(store.export_csv(&mut out).unwrap(), 1);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,active_power_w,total_power_import_kwh,total_power_export_kwh")
        );
        assert_eq!(lines.next(), Some("1709294400.0,1500.0,10.5,2.25"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_import_skips_bad_and_duplicate_records() {
        let csv = "\
timestamp,active_power_w,total_power_import_kwh,total_power_export_kwh
1709294400.0,1500,10.5,2.25
1709295300.0,1400,10.6,
1709296200.0,abc,10.7,2.25
1709294400.0,1500,10.5,2.25
1709297100.0, 1300 ,10.8,2.25
";
        let store = Store::open_in_memory().unwrap();
        let result = store.import_csv(csv.as_bytes()).unwrap();

        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 3);
        assert_eq!(store.count_readings().unwrap(), 2);
    }

    #[test]
    fn test_export_then_import_into_fresh_store() {
        let source = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 12:00 UTC);
        for i in 0..3 {
            source
                .insert_reading(&Reading::new(
                    t0 + time::Duration::minutes(15 * i),
                    100.0,
                    i as f64,
                    0.0,
                ))
                .unwrap();
        }

        let mut buf = Vec::new();
        source.export_csv(&mut buf).unwrap();

        let target = Store::open_in_memory().unwrap();
        let result = target.import_csv(buf.as_slice()).unwrap();
        assert_eq!(result.inserted, 3);
        assert_eq!(target.all_readings().unwrap(), source.all_readings().unwrap());
    }
}
