//! Background meter collector.

use std::sync::Arc;
use std::time::Duration;

use p1dash_core::{ClientError, MeterClient, MeterSource};
use time::OffsetDateTime;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Background collector that polls the meter on the configured interval.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start polling the configured meter.
    ///
    /// Returns immediately; collection happens in a background task.
    pub async fn start(&self) -> Result<(), CollectorError> {
        let meter = self.state.config.read().await.meter.clone();

        if !meter.enabled {
            info!("Meter polling disabled in configuration");
            return Ok(());
        }

        let client = MeterClient::new(&meter.url, meter.timeout()).map_err(CollectorError::Fetch)?;
        self.start_with(client, meter.poll_interval());
        Ok(())
    }

    /// Start polling an arbitrary source.
    pub fn start_with<S>(&self, source: S, poll_interval: Duration) -> tokio::task::JoinHandle<()>
    where
        S: MeterSource + 'static,
    {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            collect(state, source, poll_interval).await;
        })
    }
}

/// Poll `source` forever.
async fn collect<S: MeterSource>(state: Arc<AppState>, source: S, poll_interval: Duration) {
    info!(
        "Starting collector for {} (interval: {}s)",
        source.name(),
        poll_interval.as_secs()
    );

    {
        let mut stats = state.collector.stats.write().await;
        stats.source = Some(source.name().to_string());
        stats.poll_interval = poll_interval.as_secs();
    }
    state.collector.set_running(true);

    let mut interval_timer = interval(poll_interval);
    let mut consecutive_failures = 0u32;

    loop {
        interval_timer.tick().await;
        let now = OffsetDateTime::now_utc();

        match poll_once(&state, &source, now).await {
            Ok(inserted) => {
                if consecutive_failures > 3 {
                    info!("{} reachable again", source.name());
                }
                consecutive_failures = 0;
                state
                    .collector
                    .stats
                    .write()
                    .await
                    .record_success(now, inserted);
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!(
                        "Failed to poll {}: {} (attempt {})",
                        source.name(),
                        e,
                        consecutive_failures
                    );
                } else if consecutive_failures == 4 {
                    error!(
                        "Failed to poll {} after {} attempts, will continue trying silently",
                        source.name(),
                        consecutive_failures
                    );
                }
                state
                    .collector
                    .stats
                    .write()
                    .await
                    .record_failure(now, e.to_string());
            }
        }
    }
}

/// Fetch one sample and store it.
///
/// Returns `false` when a sample with the same timestamp was already stored.
pub async fn poll_once<S: MeterSource + ?Sized>(
    state: &AppState,
    source: &S,
    now: OffsetDateTime,
) -> Result<bool, CollectorError> {
    let reading = source
        .fetch_reading(now)
        .await
        .map_err(CollectorError::Fetch)?;

    let inserted = {
        let store = state.store.lock().await;
        store
            .insert_reading(&reading)
            .map_err(CollectorError::Store)?
    };

    debug!(
        "Collected reading: {} W, import {} kWh, export {} kWh",
        reading.active_power_w, reading.import_kwh, reading.export_kwh
    );
    Ok(inserted)
}

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to fetch: {0}")]
    Fetch(ClientError),
    #[error("Failed to store: {0}")]
    Store(p1dash_store::Error),
}
