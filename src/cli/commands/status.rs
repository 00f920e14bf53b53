//! Status command implementation
//!
//! Lists the snapshots stored per entity table and the most recent runs.

use super::load_or_report;
use crate::adapters::duckdb::DuckDbStore;
use crate::config::OrderflowConfig;
use crate::domain::Result;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of snapshots and runs to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking pipeline status");

        println!("📊 Pipeline Status");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let store = match DuckDbStore::open_existing(&config.database.path) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open database");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let printed = print_status(&store, &config, self.limit);
        store.close()?;

        match printed {
            Ok(()) => Ok(0),
            Err(e) => {
                println!("❌ Failed to read status");
                println!("   Error: {e}");
                Ok(e.exit_code())
            }
        }
    }
}

fn print_status(store: &DuckDbStore, config: &OrderflowConfig, limit: usize) -> Result<()> {
    println!("Database: {}", config.database.path.display());
    println!();

    for table in [config.database.orders_ref(), config.database.line_items_ref()] {
        if !store.relation_exists(&table)? {
            println!("{table}: not created yet");
            println!();
            continue;
        }

        let total = store.count_rows(&table)?;
        println!("{table}: {total} row(s)");
        println!("  {:<28} {:>10}", "Snapshot", "Rows");
        println!("  {}", "-".repeat(39));
        for (snapshot, rows) in store.snapshot_counts(&table, limit)? {
            println!("  {snapshot:<28} {rows:>10}");
        }
        println!();
    }

    if !store.has_run_history()? {
        println!("No run history table. Run 'orderflow init' to create it.");
        return Ok(());
    }

    let runs = store.recent_runs(limit)?;
    if runs.is_empty() {
        println!("No runs recorded yet.");
        println!("Run 'orderflow run' to start the pipeline.");
        return Ok(());
    }

    println!("Recent runs:");
    println!(
        "  {:<36} {:<26} {:<8} {:>4} {:>4} {:>4} {:>10}",
        "Run ID", "Started", "Status", "OK", "Fail", "Skip", "Duration"
    );
    println!("  {}", "-".repeat(100));
    for run in runs {
        let status = if run.status == "success" { "✅" } else { "❌" };
        println!(
            "  {:<36} {:<26} {:<8} {:>4} {:>4} {:>4} {:>9.2}s",
            run.run_id,
            run.started_at,
            status,
            run.materialized,
            run.failed,
            run.skipped,
            run.duration_ms as f64 / 1000.0
        );
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::RunRecord;

    #[test]
    fn test_status_args_default_limit() {
        let args = StatusArgs { limit: 10 };
        assert_eq!(args.limit, 10);
    }

    #[test]
    fn test_print_status_on_bootstrapped_database() {
        let store = DuckDbStore::in_memory().unwrap();
        store.ensure_run_history().unwrap();
        store
            .record_run(&RunRecord {
                run_id: "r1".to_string(),
                snapshot_date: "2024-01-01 00:00:00".to_string(),
                started_at: "2024-01-01 00:00:00".to_string(),
                status: "success".to_string(),
                materialized: 4,
                failed: 0,
                skipped: 0,
                duration_ms: 10,
            })
            .unwrap();

        assert!(print_status(&store, &OrderflowConfig::default(), 5).is_ok());
    }
}
