//! Dev Studio CLI and REST API entry point.
//!
//! Binary name: `devstudio`
//!
//! Loads `.env`, resolves configuration (TOML file, then environment), then
//! either prints it or starts the REST API server.

mod cli;
mod http;
mod state;

use std::time::Instant;

use clap::Parser;

use cli::{Cli, Commands};
use devstudio_infra::config::resolve_config;
use devstudio_observe::{LogFormat, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside local development.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    init_tracing(format, otel, cli.verbose)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    if let Ok(path) = &dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config { config } => {
            let (config, creds) = resolve_config(config.as_deref()).await;
            cli::config::print(&config, &creds)?;
        }

        Commands::Serve {
            host,
            port,
            config,
            otel: _,
        } => {
            let (mut config, creds) = resolve_config(config.as_deref()).await;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let state = AppState::init(&config, &creds).await?;
            let pruner = http::middleware::rate_limit::spawn_pruner(state.rate_limiter.clone());
            let router = http::router::build_router(state);

            let addr = format!("{}:{}", config.host, config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            let started = Instant::now();

            tracing::info!(
                %addr,
                environment = ?config.environment,
                memory_backend = ?config.memory.backend,
                "Dev Studio API listening"
            );

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            pruner.abort();
            tracing::info!(uptime_secs = started.elapsed().as_secs(), "Server stopped");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
