//! Stats command - summarise the store.

use anyhow::Result;
use p1dash_core::{LatestReading, LoaderOptions};
use p1dash_service::pipeline;
use p1dash_store::{Store, TimeRange};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Store summary.
#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub readings: u64,
    pub range: Option<TimeRange>,
    pub latest: Option<LatestReading>,
}

impl StoreStats {
    /// Collect the summary from `store`.
    pub fn collect(store: &Store, options: &LoaderOptions) -> Result<Self> {
        Ok(Self {
            readings: store.count_readings()?,
            range: store.time_range()?,
            latest: pipeline::latest_reading(store, options)?,
        })
    }
}

/// Execute the stats command.
pub fn cmd_stats(store: &Store, options: &LoaderOptions, format: OutputFormat) -> Result<()> {
    let stats = StoreStats::collect(store, options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Readings: {}", stats.readings);
            if let Some(range) = stats.range {
                let first = options.localize(range.first);
                let last = options.localize(range.last);
                println!("  First: {}", first);
                println!("  Last:  {}", last);
                println!("  Span:  {} days", range.span().whole_days());
            }
            match stats.latest {
                Some(latest) => {
                    let direction = if latest.is_export { "export" } else { "import" };
                    println!("Latest sample ({}):", latest.label);
                    println!("  Power:  {} W ({})", latest.active_w.abs(), direction);
                    println!("  Import: {} kWh", latest.import_kwh);
                    println!("  Export: {} kWh", latest.export_kwh);
                }
                None => println!("No readings stored. Run 'p1dash poll' or 'p1dash import'."),
            }
        }
    }

    Ok(())
}
