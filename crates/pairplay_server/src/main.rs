//! Pairplay - game server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use pairplay_server::{Dispatcher, ServerConfig};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve { port, host, config } => run_server(config, host, port).await,
    }
}

/// Run the WebSocket game server
#[instrument(skip_all)]
async fn run_server(
    config: Option<std::path::PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = ServerConfig::load(config.as_deref(), host, port)?;
    info!(addr = %config.bind_addr(), "Starting pairplay server");

    let dispatcher = Dispatcher::shared();
    pairplay_server::serve(&config, dispatcher).await
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pairplay_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
