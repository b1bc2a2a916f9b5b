//! Poll command - store one sample from the meter.

use std::time::Duration;

use anyhow::{Context, Result};
use p1dash_core::{MeterClient, MeterSource};
use p1dash_service::Config;
use time::OffsetDateTime;
use tracing::info;

use crate::util::open_store;

/// Execute the poll command.
pub async fn cmd_poll(config: &Config, url: Option<String>, timeout: Option<u64>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.meter.url.clone());
    let timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.meter.timeout());

    let client = MeterClient::new(&url, timeout)?;
    let reading = client
        .fetch_reading(OffsetDateTime::now_utc())
        .await
        .with_context(|| format!("Failed to poll {}", client.name()))?;

    let store = open_store(config)?;
    if store.insert_reading(&reading)? {
        info!(
            "Stored reading: {} W, import {} kWh, export {} kWh",
            reading.active_power_w, reading.import_kwh, reading.export_kwh
        );
    } else {
        info!("Reading at {} was already stored", reading.timestamp);
    }

    Ok(())
}
