//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for CObs using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// CObs - checkpointed outbreak metrics builder
#[derive(Parser, Debug)]
#[command(name = "cobs")]
#[command(version, about, long_about = None)]
#[command(author = "CObs Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cobs.toml", env = "COBS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COBS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and publish results for every pending timeline index
    Build(commands::build::BuildArgs),

    /// Append a comma-separated source file to the source stream as one checkpoint
    Ingest(commands::ingest::IngestArgs),

    /// Show the latest published build and pending source work
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
