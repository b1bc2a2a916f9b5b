//! P1 dashboard service - meter collector and HTTP server.
//!
//! Run with: `cargo run -p p1dash-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use p1dash_service::{AppState, Collector, Config, api};
use p1dash_store::Store;

/// P1 dashboard service - meter collector and HTTP server.
#[derive(Parser, Debug)]
#[command(name = "p1dash-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Dashboard page path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable the meter collector (serve only).
    #[arg(long)]
    no_collector: bool,

    /// Log debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("p1dash_service={}", level).parse()?)
                .add_directive(format!("p1dash_core={}", level).parse()?)
                .add_directive(format!("p1dash_store={}", level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            warn!("Ignoring unreadable default config: {}", e);
            Config::default()
        }),
    };

    // Override config with CLI args
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }
    if let Some(output) = args.output {
        config.output.path = output;
    }
    if args.no_collector {
        config.meter.enabled = false;
    }

    config.validate()?;

    let store = Store::open(&config.storage.path)
        .with_context(|| format!("Failed to open {}", config.storage.path.display()))?;
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;

    let state = AppState::new(store, config);

    // Start the background collector
    Collector::new(Arc::clone(&state))
        .start()
        .await
        .context("Failed to start collector")?;

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Dashboard available at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
