// CObs - Checkpointed outbreak metrics builder
// Copyright (c) 2025 CObs Contributors
// Licensed under the MIT License

use cobs::cli::{Cli, Commands};
use cobs::config::load_config;
use cobs::domain::CobsError;
use cobs::log_error_with_context;
use cobs::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config when it loads; commands report config errors themselves
    let config = load_config(&cli.config).ok();
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "CObs - checkpointed outbreak metrics builder"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_shutdown().await;
        println!("\nShutdown signal received, finishing the job in flight...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            log_error_with_context!(&e, "Command execution failed");
            eprintln!("Error: {e}");
            e.downcast_ref::<CobsError>()
                .map(|err| err.exit_code())
                .unwrap_or(5) // Fatal error exit code
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                    }
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to create SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown..."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Build(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Ingest(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
    }
}
