//! Command-line interface for pairplay.

use clap::{Parser, Subcommand};

/// Pairplay - anonymous two-player tic-tac-toe matchmaking server
#[derive(Parser, Debug)]
#[command(name = "pairplay")]
#[command(about = "Pairs anonymous WebSocket clients into tic-tac-toe games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Port to bind to (default 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Path to a TOML config file with `host` and `port`
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
