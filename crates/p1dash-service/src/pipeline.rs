//! One generation pass: store rows to a rendered dashboard page.
//!
//! Shared by the `/refresh` endpoint and the `p1dash generate` command.
//! A failed pass never touches the previously written page.

use std::path::{Path, PathBuf};

use p1dash_core::{Dashboard, LatestReading, LoaderOptions, render_html};
use p1dash_store::{ReadingQuery, Store};
use time::OffsetDateTime;
use tracing::{debug, info};

/// Errors from a generation pass.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] p1dash_store::Error),
    #[error(transparent)]
    Engine(#[from] p1dash_core::Error),
    #[error("Failed to render dashboard: {0}")]
    Render(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load every stored row and aggregate it.
///
/// `now` is shown as the generation time, in the configured zone.
pub fn build_dashboard(
    store: &Store,
    options: &LoaderOptions,
    now: OffsetDateTime,
) -> Result<Dashboard, PipelineError> {
    let rows = store.all_readings()?;
    debug!("Read {} stored rows", rows.len());
    let readings = p1dash_core::load(&rows, options)?;
    Ok(Dashboard::build(&readings, options.localize(now))?)
}

/// Rows fetched per page while looking for the newest usable reading.
const LATEST_PAGE_SIZE: u32 = 64;

/// The newest stored reading that passes validation, localised and scaled.
///
/// Pages through the store newest first; `None` when no row is usable.
pub fn latest_reading(
    store: &Store,
    options: &LoaderOptions,
) -> Result<Option<LatestReading>, PipelineError> {
    let mut offset = 0;
    loop {
        let query = ReadingQuery::new().limit(LATEST_PAGE_SIZE).offset(offset);
        let rows = store.query_readings(&query)?;
        if let Some(reading) = p1dash_core::first_valid(&rows, options) {
            return Ok(Some(LatestReading::from(&reading)));
        }
        if rows.len() < LATEST_PAGE_SIZE as usize {
            return Ok(None);
        }
        offset += LATEST_PAGE_SIZE;
    }
}

/// Render `dashboard` and replace the page at `path`.
///
/// The page is written to a sibling file first and renamed into place.
pub fn write_page(dashboard: &Dashboard, path: &Path) -> Result<(), PipelineError> {
    let html = render_html(dashboard)?;

    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| PipelineError::Write { path, source }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err(parent))?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    std::fs::write(&staging, html).map_err(write_err(&staging))?;
    std::fs::rename(&staging, path).map_err(write_err(path))?;
    Ok(())
}

/// Run a full pass and write the page.
pub fn generate(
    store: &Store,
    options: &LoaderOptions,
    output: &Path,
) -> Result<Dashboard, PipelineError> {
    let dashboard = build_dashboard(store, options, OffsetDateTime::now_utc())?;
    write_page(&dashboard, output)?;
    info!(
        "Dashboard written to {} (latest reading {})",
        output.display(),
        dashboard.latest.label
    );
    Ok(dashboard)
}
