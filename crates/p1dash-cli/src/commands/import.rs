//! Import command - bulk load raw logs or CSV dumps.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use p1dash_core::{LoaderOptions, LogStats, load_log};
use p1dash_store::{ImportResult, Store};
use tracing::{debug, info};

use crate::cli::ImportFormat;
use crate::util::collect_log_files;

/// Totals over every imported file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files read.
    pub files: usize,
    /// Records looked at.
    pub processed: usize,
    /// Records written.
    pub inserted: usize,
    /// Unparseable records, repeats and already stored timestamps.
    pub skipped: usize,
}

impl ImportSummary {
    fn add_log(&mut self, stats: LogStats, result: ImportResult) {
        self.processed += stats.lines;
        self.inserted += result.inserted;
        self.skipped += stats.skipped + stats.duplicates + result.skipped;
    }

    fn add_csv(&mut self, result: ImportResult) {
        self.processed += result.total();
        self.inserted += result.inserted;
        self.skipped += result.skipped;
    }
}

/// Execute the import command.
pub fn cmd_import(
    store: &Store,
    paths: &[PathBuf],
    format: ImportFormat,
    options: &LoaderOptions,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    let files = match format {
        ImportFormat::Jsonl => collect_log_files(paths)?,
        ImportFormat::Csv => paths.to_vec(),
    };

    for path in files {
        let file =
            File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        summary.files += 1;

        match format {
            ImportFormat::Jsonl => {
                let (readings, stats) = load_log(BufReader::new(file), options)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let result = store.insert_readings(&readings)?;
                debug!(
                    "{}: {} lines, {} inserted",
                    path.display(),
                    stats.lines,
                    result.inserted
                );
                summary.add_log(stats, result);
            }
            ImportFormat::Csv => {
                let result = store
                    .import_csv(file)
                    .with_context(|| format!("Failed to import {}", path.display()))?;
                summary.add_csv(result);
            }
        }
    }

    info!(
        "Imported {} file(s): {} processed, {} inserted, {} skipped",
        summary.files, summary.processed, summary.inserted, summary.skipped
    );
    Ok(summary)
}
