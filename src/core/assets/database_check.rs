//! Database reachability check

use super::{Asset, AssetKey, Materialization};
use crate::adapters::duckdb::DuckDbStore;
use crate::core::pipeline::RunContext;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;

/// Fails unless the database file exists and its catalog lists a table
pub struct DatabaseCheck;

#[async_trait]
impl Asset for DatabaseCheck {
    fn key(&self) -> AssetKey {
        AssetKey::DatabaseCheck
    }

    fn deps(&self) -> &[AssetKey] {
        &[]
    }

    async fn materialize(&self, ctx: &RunContext) -> Result<Materialization> {
        let path = &ctx.config.database.path;
        let store = DuckDbStore::open_existing(path)?;

        let entries = store.catalog_entries();
        store.close()?;
        let entries = entries?;

        if entries.is_empty() {
            return Err(PipelineError::Connectivity(format!(
                "Database {} has no tables; run `orderflow init` to bootstrap it",
                path.display()
            )));
        }

        for entry in &entries {
            tracing::debug!(table = %entry, "Catalog entry");
        }

        Ok(
            Materialization::new(format!("{} table(s) found", entries.len()))
                .with_metadata("tables", entries.len())
                .with_metadata("path", path.display()),
        )
    }
}
