//! CLI command definitions for the `devstudio` binary.

pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AI-assisted development studio backend.
#[derive(Parser)]
#[command(name = "devstudio", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Host to bind to (overrides config and HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a TOML config file (default: ./devstudio.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Print the resolved configuration as JSON.
    Config {
        /// Path to a TOML config file (default: ./devstudio.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
