use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use p1dash_cli::cli::{Cli, Commands};
use p1dash_cli::commands::{cmd_export, cmd_generate, cmd_import, cmd_poll, cmd_stats};
use p1dash_cli::util::open_store;
use p1dash_service::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "p1dash", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.storage.path = path;
    }
    config.validate()?;

    match cli.command {
        Commands::Poll { url, timeout } => cmd_poll(&config, url, timeout).await?,
        Commands::Import { paths, format } => {
            let options = config.dashboard.loader_options()?;
            let store = open_store(&config)?;
            let summary = cmd_import(&store, &paths, format, &options)?;
            if !cli.quiet {
                println!("Import complete:");
                println!("  Files: {}", summary.files);
                println!("  Processed: {}", summary.processed);
                println!("  Inserted: {}", summary.inserted);
                println!("  Skipped: {}", summary.skipped);
            }
        }
        Commands::Generate { output } => cmd_generate(&config, output, cli.quiet)?,
        Commands::Export {
            format,
            output,
            compact,
        } => cmd_export(&config, format, output.as_deref(), compact)?,
        Commands::Stats { format } => {
            let options = config.dashboard.loader_options()?;
            let store = open_store(&config)?;
            cmd_stats(&store, &options, format)?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
