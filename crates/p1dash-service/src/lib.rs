//! Meter collector and HTTP dashboard server for P1 smart meters.
//!
//! This crate provides a service that:
//! - Polls the meter's HTTP data endpoint on a schedule
//! - Stores every sample in the local database
//! - Regenerates and serves the energy dashboard page on demand
//!
//! # Endpoints
//!
//! - `GET /` - The last rendered dashboard page
//! - `GET /refresh` - Regenerate the page from the store
//! - `GET /api/health` - Service health check
//! - `GET /api/dashboard` - Aggregate snapshot as JSON
//! - `GET /api/readings/latest` - Newest stored sample
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/p1dash/config.toml`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//!
//! [storage]
//! path = "~/.local/share/p1dash/p1_data.db"
//!
//! [meter]
//! url = "http://192.168.178.128/api/v1/data"
//! poll_interval = 60
//!
//! [dashboard]
//! timezone = "Europe/Amsterdam"
//! power_divisor = 10.0
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod pipeline;
pub mod state;

pub use collector::{Collector, CollectorError};
pub use config::{
    Config, ConfigError, DashboardConfig, MeterConfig, OutputConfig, ServerConfig, StorageConfig,
    default_config_path,
};
pub use pipeline::PipelineError;
pub use state::{AppState, CollectionStats};
