//! Sequential pipeline runner

use super::context::RunContext;
use super::graph::AssetGraph;
use super::summary::{AssetOutcome, RunSummary};
use crate::adapters::duckdb::DuckDbStore;
use crate::config::OrderflowConfig;
use crate::core::assets::{default_assets, Asset, AssetKey};
use crate::domain::Result;
use crate::{log_asset_complete, log_asset_failed, log_asset_start};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Runs the planned assets one after another
///
/// A failed asset does not stop the run, but every asset depending on it is
/// skipped.
///
/// # Example
///
/// ```rust,no_run
/// use orderflow::config::load_config;
/// use orderflow::core::pipeline::PipelineRunner;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("orderflow.toml")?;
/// let runner = PipelineRunner::with_default_assets()?;
/// let summary = runner.run(Arc::new(config), &[]).await?;
/// println!("exit code {}", summary.exit_code());
/// # Ok(())
/// # }
/// ```
pub struct PipelineRunner {
    graph: AssetGraph,
    record_history: bool,
}

impl PipelineRunner {
    pub fn new(assets: Vec<Box<dyn Asset>>) -> Result<Self> {
        Ok(Self {
            graph: AssetGraph::new(assets)?,
            record_history: true,
        })
    }

    pub fn with_default_assets() -> Result<Self> {
        Self::new(default_assets())
    }

    /// Do not append finished runs to `meta.pipeline_runs`
    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }

    /// Materialize `selection` (all assets when empty) with a fresh snapshot
    pub async fn run(&self, config: Arc<OrderflowConfig>, selection: &[AssetKey]) -> Result<RunSummary> {
        self.run_with_context(RunContext::new(config), selection).await
    }

    pub async fn run_with_context(&self, ctx: RunContext, selection: &[AssetKey]) -> Result<RunSummary> {
        let plan = self.graph.plan(selection)?;
        let start = Instant::now();
        let mut summary = RunSummary::new(ctx.run_id, ctx.snapshot, ctx.started_at);

        tracing::info!(
            run_id = %ctx.run_id,
            snapshot = %ctx.snapshot,
            assets = plan.len(),
            "Starting run"
        );

        let mut blocked: HashSet<AssetKey> = HashSet::new();

        for asset in plan {
            let key = asset.key();

            if let Some(upstream) = asset.deps().iter().find(|d| blocked.contains(*d)) {
                tracing::warn!(asset = %key, upstream = %upstream, "Skipping asset");
                summary.push(AssetOutcome::skipped(
                    key,
                    format!("Upstream asset '{upstream}' did not materialize"),
                ));
                blocked.insert(key);
                continue;
            }

            log_asset_start!(key);
            let asset_start = Instant::now();

            match asset.materialize(&ctx).await {
                Ok(materialization) => {
                    let elapsed = asset_start.elapsed();
                    log_asset_complete!(key, materialization.message, elapsed);
                    summary.push(AssetOutcome::materialized(key, materialization, elapsed));
                }
                Err(e) => {
                    let elapsed = asset_start.elapsed();
                    log_asset_failed!(key, e, elapsed);
                    summary.push(AssetOutcome::failed(key, e.to_string(), e.exit_code(), elapsed));
                    blocked.insert(key);
                }
            }
        }

        let summary = summary.with_duration(start.elapsed());
        if self.record_history {
            record_history(&ctx, &summary);
        }
        summary.log_summary();

        Ok(summary)
    }
}

/// Append the run to `meta.pipeline_runs` if that table exists
///
/// Never fails the run.
fn record_history(ctx: &RunContext, summary: &RunSummary) {
    let path = &ctx.config.database.path;
    if !path.is_file() {
        return;
    }

    let result = DuckDbStore::open_existing(path).and_then(|store| {
        let recorded = match store.has_run_history() {
            Ok(true) => store.record_run(&summary.to_run_record()).map(|_| true),
            Ok(false) => Ok(false),
            Err(e) => Err(e),
        };
        store.close()?;
        recorded
    });

    match result {
        Ok(true) => tracing::debug!(run_id = %summary.run_id, "Recorded run history"),
        Ok(false) => tracing::debug!("No run history table, not recording run"),
        Err(e) => tracing::warn!(error = %e, "Failed to record run history"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::Materialization;
    use crate::core::pipeline::AssetStatus;
    use crate::domain::PipelineError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        key: AssetKey,
        deps: Vec<AssetKey>,
        fail: bool,
        calls: Arc<Mutex<Vec<AssetKey>>>,
    }

    #[async_trait]
    impl Asset for Scripted {
        fn key(&self) -> AssetKey {
            self.key
        }

        fn deps(&self) -> &[AssetKey] {
            &self.deps
        }

        async fn materialize(&self, _ctx: &RunContext) -> Result<Materialization> {
            self.calls.lock().unwrap().push(self.key);
            if self.fail {
                Err(PipelineError::IdentityMismatch {
                    expected: "a".into(),
                    actual: "b".into(),
                })
            } else {
                Ok(Materialization::new("ok"))
            }
        }
    }

    fn runner(failing: &[AssetKey], calls: &Arc<Mutex<Vec<AssetKey>>>) -> PipelineRunner {
        let assets = default_assets()
            .into_iter()
            .map(|a| {
                Box::new(Scripted {
                    key: a.key(),
                    deps: a.deps().to_vec(),
                    fail: failing.contains(&a.key()),
                    calls: calls.clone(),
                }) as Box<dyn Asset>
            })
            .collect();
        PipelineRunner::new(assets).unwrap()
    }

    fn config() -> Arc<OrderflowConfig> {
        let mut config = OrderflowConfig::default();
        config.database.path = std::env::temp_dir().join("orderflow-runner-test-absent.db");
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_all_assets_run_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let summary = runner(&[], &calls).run(config(), &[]).await.unwrap();

        assert!(summary.is_successful());
        assert_eq!(*calls.lock().unwrap(), AssetKey::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_failure_skips_downstream_only() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let summary = runner(&[AssetKey::ApiCheck], &calls)
            .run(config(), &[])
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![AssetKey::DatabaseCheck, AssetKey::ApiCheck]
        );
        assert_eq!(
            summary.outcome(AssetKey::DatabaseCheck).unwrap().status,
            AssetStatus::Materialized
        );
        assert_eq!(
            summary.outcome(AssetKey::OrdersExtractLoad).unwrap().status,
            AssetStatus::Skipped
        );
        assert_eq!(
            summary.outcome(AssetKey::CsvExport).unwrap().status,
            AssetStatus::Skipped
        );
        assert_eq!(summary.exit_code(), crate::domain::errors::EXIT_IDENTITY_MISMATCH);
    }

    #[tokio::test]
    async fn test_selection_runs_only_selected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let summary = runner(&[], &calls)
            .run(config(), &[AssetKey::CsvExport])
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![AssetKey::CsvExport]);
        assert_eq!(summary.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_all_assets_share_one_snapshot() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let ctx = RunContext::new(config());
        let snapshot = ctx.snapshot;
        let summary = runner(&[], &calls)
            .run_with_context(ctx, &[])
            .await
            .unwrap();
        assert_eq!(summary.snapshot, snapshot);
    }

    #[tokio::test]
    async fn test_history_recorded_unless_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = OrderflowConfig::default();
        config.database.path = dir.path().join("database.db");
        crate::cli::commands::init::bootstrap_database(&config.database.path).unwrap();
        let config = Arc::new(config);
        let calls = Arc::new(Mutex::new(Vec::new()));

        runner(&[], &calls)
            .without_history()
            .run(config.clone(), &[AssetKey::DatabaseCheck])
            .await
            .unwrap();
        let store = DuckDbStore::open_existing(&config.database.path).unwrap();
        assert!(store.recent_runs(10).unwrap().is_empty());
        store.close().unwrap();

        runner(&[], &calls).run(config.clone(), &[]).await.unwrap();
        let store = DuckDbStore::open_existing(&config.database.path).unwrap();
        assert_eq!(store.recent_runs(10).unwrap().len(), 1);
        store.close().unwrap();
    }
}
