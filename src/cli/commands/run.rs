//! Run command implementation
//!
//! Materializes every asset, or the ones named with `--asset`.

use super::load_or_report;
use crate::core::assets::AssetKey;
use crate::core::pipeline::{AssetStatus, PipelineRunner, RunSummary};
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Materialize only this asset (repeatable): database_check, api_check,
    /// orders_extract_load, csv_export
    #[arg(short, long = "asset", value_name = "ASSET", value_parser = AssetKey::from_str)]
    pub assets: Vec<AssetKey>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(assets = ?self.assets, "Starting run command");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("🚀 Running pipeline...");
        println!();

        run_and_report(Arc::new(config), &self.assets, true).await
    }
}

/// Run `selection` with the default assets and print the summary
///
/// With `record_history` the run is appended to the run history table.
pub(crate) async fn run_and_report(
    config: Arc<crate::config::OrderflowConfig>,
    selection: &[AssetKey],
    record_history: bool,
) -> anyhow::Result<i32> {
    let mut runner = PipelineRunner::with_default_assets()?;
    if !record_history {
        runner = runner.without_history();
    }

    let summary = match runner.run(config, selection).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Run could not start");
            println!("❌ Run could not start");
            println!("   Error: {e}");
            return Ok(e.exit_code());
        }
    };

    print_summary(&summary);

    if summary.is_successful() {
        println!("✅ Run completed successfully!");
    } else {
        println!("❌ Run failed (exit code {})", summary.exit_code());
    }

    Ok(summary.exit_code())
}

/// Print the per-asset outcome table
pub(crate) fn print_summary(summary: &RunSummary) {
    println!("📊 Run Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Snapshot: {}", summary.snapshot);
    println!();

    for outcome in &summary.outcomes {
        let icon = match outcome.status {
            AssetStatus::Materialized => "✅",
            AssetStatus::Failed => "❌",
            AssetStatus::Skipped => "⏭️ ",
        };
        println!(
            "  {icon} {:<22} {:>8.2}s  {}",
            outcome.key.as_str(),
            outcome.duration.as_secs_f64(),
            outcome.message
        );
        for (key, value) in outcome.metadata.iter().filter(|(_, v)| !v.is_empty()) {
            println!("       {key}: {value}");
        }
    }

    println!();
    println!(
        "  Materialized: {}  Failed: {}  Skipped: {}",
        summary.materialized_count(),
        summary.failed_count(),
        summary.skipped_count()
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}
