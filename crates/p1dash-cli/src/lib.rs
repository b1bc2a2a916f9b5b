//! Command-line interface for the P1 energy dashboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `poll` | Fetch one sample from the meter and store it |
//! | `import` | Load raw JSONL logs or a CSV dump into the store |
//! | `generate` | Aggregate the store and write the dashboard page |
//! | `export` | Print the snapshot as JSON or the raw table as CSV |
//! | `stats` | Reading count, time range and latest sample |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The CLI shares `~/.config/p1dash/config.toml` (or platform equivalent) with
//! `p1dash-service`. `--config` points elsewhere and `--database` overrides the
//! store path.
//!
//! # Environment Variables
//!
//! - `P1DASH_CONFIG`: Configuration file (overridden by `--config`)
//! - `P1DASH_DATABASE`: Database path (overridden by `--database`)
//! - `RUST_LOG`: Log filter
//!
//! # Examples
//!
//! Log a sample every minute from cron:
//! ```bash
//! * * * * * p1dash --quiet poll
//! ```
//!
//! Import a directory of daily logs and render the page:
//! ```bash
//! p1dash import ~/p1logs
//! p1dash generate --output ~/p1logs/energie_dashboard.html
//! ```

pub mod cli;
pub mod commands;
pub mod util;

pub use p1dash_core;
pub use p1dash_service::Config;
