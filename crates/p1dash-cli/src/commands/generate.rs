//! Generate command - write the dashboard page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use p1dash_service::{Config, pipeline};

use crate::util::open_store;

/// Execute the generate command.
pub fn cmd_generate(config: &Config, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    let options = config.dashboard.loader_options()?;
    let output = output.unwrap_or_else(|| config.output.path.clone());
    let store = open_store(config)?;

    let dashboard = pipeline::generate(&store, &options, &output)
        .context("Failed to generate dashboard")?;

    if !quiet {
        println!(
            "Dashboard written to {} (latest reading {})",
            output.display(),
            dashboard.latest.label
        );
    }
    Ok(())
}
