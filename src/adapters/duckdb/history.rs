//! Run history table
//!
//! `meta.pipeline_runs` is created by `orderflow init` and never implicitly by
//! a run, so a database nobody bootstrapped stays untouched (and the catalog
//! check keeps its meaning).

use super::store::DuckDbStore;
use crate::domain::{Result, TableRef};
use ::duckdb::params;
use serde::Serialize;

pub const HISTORY_SCHEMA: &str = "meta";
pub const HISTORY_TABLE: &str = "pipeline_runs";

/// One row of `meta.pipeline_runs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub snapshot_date: String,
    pub started_at: String,
    pub status: String,
    pub materialized: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

pub fn history_table() -> TableRef {
    TableRef::new(HISTORY_SCHEMA, HISTORY_TABLE)
}

impl DuckDbStore {
    /// Create the run history table if it does not exist
    pub fn ensure_run_history(&self) -> Result<()> {
        self.create_schema_if_not_exists(HISTORY_SCHEMA)?;
        self.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                run_id VARCHAR PRIMARY KEY, \
                snapshot_date TIMESTAMP NOT NULL, \
                started_at TIMESTAMP NOT NULL, \
                status VARCHAR NOT NULL, \
                materialized BIGINT NOT NULL, \
                failed BIGINT NOT NULL, \
                skipped BIGINT NOT NULL, \
                duration_ms BIGINT NOT NULL)",
            history_table().quoted()
        ))
    }

    pub fn has_run_history(&self) -> Result<bool> {
        self.relation_exists(&history_table())
    }

    pub fn record_run(&self, record: &RunRecord) -> Result<()> {
        self.connection().execute(
            &format!(
                "INSERT OR REPLACE INTO {} VALUES \
                 (?, CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?)",
                history_table().quoted()
            ),
            params![
                record.run_id,
                record.snapshot_date,
                record.started_at,
                record.status,
                record.materialized as i64,
                record.failed as i64,
                record.skipped as i64,
                record.duration_ms as i64,
            ],
        )?;
        Ok(())
    }

    /// Most recent runs first
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let sql = format!(
            "SELECT run_id, CAST(snapshot_date AS VARCHAR), CAST(started_at AS VARCHAR), \
             status, materialized, failed, skipped, duration_ms \
             FROM {} ORDER BY started_at DESC LIMIT {limit}",
            history_table().quoted()
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(RunRecord {
                run_id: row.get(0)?,
                snapshot_date: row.get(1)?,
                started_at: row.get(2)?,
                status: row.get(3)?,
                materialized: row.get::<_, i64>(4)? as usize,
                failed: row.get::<_, i64>(5)? as usize,
                skipped: row.get::<_, i64>(6)? as usize,
                duration_ms: row.get::<_, i64>(7)? as u64,
            })
        })?;
        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }
}
