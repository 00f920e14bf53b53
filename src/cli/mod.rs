//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for orderflow using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Orderflow - Shopify orders to DuckDB pipeline
#[derive(Parser, Debug)]
#[command(name = "orderflow")]
#[command(version, about, long_about = None)]
#[command(author = "Orderflow Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "orderflow.toml", env = "ORDERFLOW_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORDERFLOW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Materialize the pipeline assets
    Run(commands::run::RunArgs),

    /// Check database and Shopify API reachability
    Check(commands::check::CheckArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show stored snapshots and recent runs
    Status(commands::status::StatusArgs),

    /// Write a sample configuration file and bootstrap the database
    Init(commands::init::InitArgs),
}
