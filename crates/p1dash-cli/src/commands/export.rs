//! Export command - snapshot JSON or raw CSV.

use std::path::Path;

use anyhow::{Context, Result};
use p1dash_service::{Config, pipeline};
use time::OffsetDateTime;

use crate::cli::ExportFormat;
use crate::util::{open_store, write_output};

/// Execute the export command.
pub fn cmd_export(
    config: &Config,
    format: ExportFormat,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let store = open_store(config)?;

    let content = match format {
        ExportFormat::Json => {
            let options = config.dashboard.loader_options()?;
            let dashboard =
                pipeline::build_dashboard(&store, &options, OffsetDateTime::now_utc())?;
            let mut json = if compact {
                serde_json::to_string(&dashboard)?
            } else {
                serde_json::to_string_pretty(&dashboard)?
            };
            json.push('\n');
            json
        }
        ExportFormat::Csv => {
            let mut buffer = Vec::new();
            store.export_csv(&mut buffer)?;
            String::from_utf8(buffer).context("CSV output is not UTF-8")?
        }
    };

    write_output(output, &content)
}
