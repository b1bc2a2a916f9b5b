//! Reading loader, aggregation engine and meter client for P1 energy dashboards.
//!
//! This crate turns the raw, irregular stream of cumulative meter readings into
//! the five chart views of the dashboard.
//!
//! # Pipeline
//!
//! ```text
//! RawReading rows ──load──▶ Vec<Reading> ──Periods::compute──▶ day/week/month/year/years
//!                                  │                                   │
//!                                  └──────────── Dashboard::build ◀────┘
//!                                                      │
//!                                                 render_html
//! ```
//!
//! Every stage is a pure function of its input. A generation pass recomputes
//! everything from the full reading set.
//!
//! # Features
//!
//! - **Loader**: drops malformed rows, applies the local zone (DST aware),
//!   scales device power, sorts and deduplicates
//! - **Aggregation**: calendar-keyed buckets with gap filling, ISO weeks and
//!   positional multi-year chunks
//! - **Counter resets**: clamped in the day view, skipped in rollups
//! - **Meter client**: async HTTP polling behind the [`MeterSource`] trait
//!
//! # Quick Start
//!
//! ```
//! use p1dash_core::{Dashboard, LoaderOptions, load};
//! use p1dash_types::RawReading;
//!
//! let rows = vec![
//!     RawReading { timestamp: Some(1_709_294_400.0), active_power_w: Some(4200.0), import_kwh: Some(100.0), export_kwh: Some(5.0) },
//!     RawReading { timestamp: Some(1_709_295_300.0), active_power_w: Some(3900.0), import_kwh: Some(100.1), export_kwh: Some(5.0) },
//! ];
//! let readings = load(&rows, &LoaderOptions::default())?;
//! let dashboard = Dashboard::build(&readings, time::OffsetDateTime::now_utc())?;
//!
//! assert_eq!(dashboard.latest.active_w, 390.0);
//! assert_eq!(dashboard.periods.day["2024-03-01"].labels, vec!["13:00", "13:15"]);
//! # Ok::<(), p1dash_core::Error>(())
//! ```

pub mod aggregate;
pub mod calendar;
pub mod client;
pub mod dashboard;
pub mod delta;
pub mod error;
pub mod loader;
pub mod render;
pub mod traits;

pub use aggregate::{Bucket, BucketMap, ChartKind, Periods};
pub use client::{ClientError, ClientResult, DEFAULT_METER_URL, MeterClient};
pub use dashboard::{Dashboard, LatestReading};
pub use error::{Error, Result};
pub use loader::{LoaderOptions, LogStats, first_valid, load, load_log, parse_log_line};
pub use render::render_html;
pub use traits::MeterSource;

// Re-export types crate
pub use p1dash_types;
