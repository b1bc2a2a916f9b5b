//! Command implementations for the CLI.

mod export;
mod generate;
mod import;
mod poll;
mod stats;

pub use export::cmd_export;
pub use generate::cmd_generate;
pub use import::{ImportSummary, cmd_import};
pub use poll::cmd_poll;
pub use stats::{StoreStats, cmd_stats};
