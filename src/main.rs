//! User-service API gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 API GATEWAY                  │
//!                         │                                              │
//!   Client Request        │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ──────────────────────┼─▶│   http   │──▶│ routing  │──▶│  proxy   │  │
//!                         │  │  server  │   │  table   │   │forwarder │  │
//!                         │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                         │                                     │        │
//!                         │                                     ▼        │
//!   Client Response       │  ┌──────────┐                 ┌──────────┐   │
//!   ◀─────────────────────┼──│ relayed  │◀────────────────│ upstream │◀──┼──── user-service
//!                         │  │ response │                 │  client  │   │
//!                         │  └──────────┘                 └──────────┘   │
//!                         │                                              │
//!                         │  config · observability · resilience ·       │
//!                         │  lifecycle                                   │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{load_config, Overrides};
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability::{logging, metrics};
use api_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Reverse-proxy gateway in front of the user-service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides file and environment.
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base URL, overrides file and environment.
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        bind_address: cli.bind,
        upstream_base_url: cli.upstream,
    };

    let config = load_config(cli.config.as_deref(), &overrides)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
