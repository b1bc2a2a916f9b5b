//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for `stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Input format for `import`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ImportFormat {
    /// Raw meter log, one `{"timestamp", "data"}` record per line
    #[default]
    Jsonl,
    /// Table dump as written by `export --format csv`
    Csv,
}

/// Output format for `export`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Aggregated dashboard snapshot
    #[default]
    Json,
    /// Raw stored readings
    Csv,
}

#[derive(Parser)]
#[command(name = "p1dash")]
#[command(author, version, about = "Energy dashboard for P1 smart meters", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "P1DASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (overrides config)
    #[arg(short, long, global = true, env = "P1DASH_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one sample from the meter and store it
    Poll {
        /// Meter data endpoint (overrides config)
        #[arg(short, long)]
        url: Option<String>,

        /// Request timeout in seconds (overrides config)
        #[arg(short = 'T', long)]
        timeout: Option<u64>,
    },

    /// Import readings from raw logs or a CSV dump
    Import {
        /// Files, or directories of *.jsonl files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Input format
        #[arg(short, long, value_enum, default_value = "jsonl")]
        format: ImportFormat,
    },

    /// Aggregate the store and write the dashboard page
    Generate {
        /// Page path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the dashboard snapshot as JSON, or the raw table as CSV
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no pretty-printing)
        #[arg(long)]
        compact: bool,
    },

    /// Show reading count, time range and latest sample
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
