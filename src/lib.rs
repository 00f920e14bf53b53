// Orderflow - Shopify orders to DuckDB pipeline
// Copyright (c) 2025 Orderflow Contributors
// Licensed under the MIT License

//! # Orderflow - Shopify orders to DuckDB
//!
//! Orderflow pulls orders from a Shopify store's Admin REST API, keeps a
//! snapshot-versioned copy of orders and line items in a local DuckDB file,
//! and writes the line items to a CSV file for downstream no-code tools.
//!
//! ## Overview
//!
//! A run materializes four assets in dependency order:
//!
//! - **database_check** - the DuckDB file exists and its catalog lists a table
//! - **api_check** - an authenticated `shop.json` call succeeds (and, if
//!   configured, reports the expected store name)
//! - **orders_extract_load** - fetch orders, flatten them, upsert both tables
//!   under the run's `snapshot_date`
//! - **csv_export** - write the line-items table to CSV
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Assets, pipeline runner and flattening
//! - [`adapters`] - Shopify API client and DuckDB store
//! - [`domain`] - Records, tables, snapshots and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orderflow::config::load_config;
//! use orderflow::core::pipeline::PipelineRunner;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(load_config("orderflow.toml")?);
//!
//!     let runner = PipelineRunner::with_default_assets()?;
//!     let summary = runner.run(config, &[]).await?;
//!
//!     println!("Snapshot {}: {} asset(s) materialized", summary.snapshot, summary.materialized_count());
//!     std::process::exit(summary.exit_code());
//! }
//! ```
//!
//! ## Snapshots
//!
//! Both tables are keyed on `(id, snapshot_date)`. Re-running with the same
//! snapshot replaces rows; every new run appends a new version of each record.
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type
//! [`domain::PipelineError`] maps onto process exit codes:
//!
//! ```rust
//! use orderflow::domain::PipelineError;
//!
//! let err = PipelineError::IdentityMismatch {
//!     expected: "My Store".to_string(),
//!     actual: "Other Store".to_string(),
//! };
//! assert_eq!(err.exit_code(), 3);
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
