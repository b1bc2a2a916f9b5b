//! Trait abstractions over meter data sources.
//!
//! The collector and the `poll` command only need "something that returns
//! the meter's current state". [`MeterClient`](crate::MeterClient) talks to a
//! real meter; tests plug in canned sources.

use async_trait::async_trait;
use p1dash_types::{MeterData, Reading};
use time::OffsetDateTime;

use crate::client::ClientResult;

/// A source of meter samples.
///
/// # Example
///
/// ```ignore
/// use p1dash_core::MeterSource;
///
/// async fn log_power<S: MeterSource>(source: &S) -> p1dash_core::ClientResult<()> {
///     let data = source.fetch().await?;
///     println!("{:?} W", data.active_power_w);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MeterSource: Send + Sync {
    /// Human-readable identity of the source, used in log lines.
    fn name(&self) -> &str;

    /// Fetch the meter's current state.
    async fn fetch(&self) -> ClientResult<MeterData>;

    /// Fetch and stamp a reading with `now`.
    ///
    /// Fails when the response lacks either energy counter.
    async fn fetch_reading(&self, now: OffsetDateTime) -> ClientResult<Reading> {
        let data = self.fetch().await?;
        Ok(data.to_reading(now)?)
    }
}
