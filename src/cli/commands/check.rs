//! Check command implementation
//!
//! Runs only the two reachability checks.

use super::load_or_report;
use super::run::run_and_report;
use crate::core::assets::AssetKey;
use clap::Args;
use std::sync::Arc;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking database and API reachability");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("🔍 Checking connectivity...");
        println!();

        run_and_report(
            Arc::new(config),
            &[AssetKey::DatabaseCheck, AssetKey::ApiCheck],
            false,
        )
        .await
    }
}
