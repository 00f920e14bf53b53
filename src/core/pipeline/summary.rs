//! Run summary and reporting

use crate::adapters::duckdb::RunRecord;
use crate::core::assets::{AssetKey, Materialization};
use crate::domain::SnapshotDate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Final state of one asset in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Materialized,
    Failed,
    /// Not attempted because an upstream asset failed
    Skipped,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Materialized => "materialized",
            AssetStatus::Failed => "failed",
            AssetStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of one asset
#[derive(Debug, Clone, Serialize)]
pub struct AssetOutcome {
    pub key: AssetKey,
    pub status: AssetStatus,
    pub message: String,
    pub metadata: Vec<(String, String)>,
    pub duration: Duration,

    /// Process exit code of the error, for failed assets
    pub exit_code: Option<i32>,
}

impl AssetOutcome {
    pub fn materialized(key: AssetKey, materialization: Materialization, duration: Duration) -> Self {
        Self {
            key,
            status: AssetStatus::Materialized,
            message: materialization.message,
            metadata: materialization.metadata,
            duration,
            exit_code: None,
        }
    }

    pub fn failed(key: AssetKey, message: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            key,
            status: AssetStatus::Failed,
            message,
            metadata: Vec::new(),
            duration,
            exit_code: Some(exit_code),
        }
    }

    pub fn skipped(key: AssetKey, message: String) -> Self {
        Self {
            key,
            status: AssetStatus::Skipped,
            message,
            metadata: Vec::new(),
            duration: Duration::ZERO,
            exit_code: None,
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub snapshot: SnapshotDate,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<AssetOutcome>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn new(run_id: Uuid, snapshot: SnapshotDate, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            snapshot,
            started_at,
            outcomes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn push(&mut self, outcome: AssetOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcome(&self, key: AssetKey) -> Option<&AssetOutcome> {
        self.outcomes.iter().find(|o| o.key == key)
    }

    fn count(&self, status: AssetStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn materialized_count(&self) -> usize {
        self.count(AssetStatus::Materialized)
    }

    pub fn failed_count(&self) -> usize {
        self.count(AssetStatus::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(AssetStatus::Skipped)
    }

    pub fn is_successful(&self) -> bool {
        self.failed_count() == 0 && self.skipped_count() == 0
    }

    /// Exit code of the first failed asset, 0 for a successful run
    pub fn exit_code(&self) -> i32 {
        self.outcomes
            .iter()
            .find_map(|o| o.exit_code)
            .unwrap_or(0)
    }

    pub fn status_str(&self) -> &'static str {
        if self.is_successful() {
            "success"
        } else {
            "failed"
        }
    }

    /// Row for the run history table
    pub fn to_run_record(&self) -> RunRecord {
        RunRecord {
            run_id: self.run_id.to_string(),
            snapshot_date: self.snapshot.to_sql_string(),
            started_at: SnapshotDate::from_datetime(self.started_at).to_sql_string(),
            status: self.status_str().to_string(),
            materialized: self.materialized_count(),
            failed: self.failed_count(),
            skipped: self.skipped_count(),
            duration_ms: self.duration.as_millis() as u64,
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            snapshot = %self.snapshot,
            materialized = self.materialized_count(),
            failed = self.failed_count(),
            skipped = self.skipped_count(),
            duration_ms = self.duration.as_millis() as u64,
            "Run completed"
        );

        for outcome in self.outcomes.iter().filter(|o| o.status != AssetStatus::Materialized) {
            tracing::warn!(
                asset = %outcome.key,
                status = outcome.status.as_str(),
                message = %outcome.message,
                "Asset did not materialize"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn summary() -> RunSummary {
        RunSummary::new(
            Uuid::nil(),
            SnapshotDate::from_str("2024-01-01 00:00:00").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_successful_summary() {
        let mut s = summary();
        s.push(AssetOutcome::materialized(
            AssetKey::DatabaseCheck,
            Materialization::new("ok"),
            Duration::from_millis(5),
        ));
        assert!(s.is_successful());
        assert_eq!(s.exit_code(), 0);
        assert_eq!(s.status_str(), "success");
    }

    #[test]
    fn test_first_failure_sets_exit_code() {
        let mut s = summary();
        s.push(AssetOutcome::failed(AssetKey::DatabaseCheck, "a".into(), 4, Duration::ZERO));
        s.push(AssetOutcome::failed(AssetKey::ApiCheck, "b".into(), 3, Duration::ZERO));
        s.push(AssetOutcome::skipped(AssetKey::CsvExport, "c".into()));

        assert_eq!(s.exit_code(), 4);
        assert_eq!(s.failed_count(), 2);
        assert_eq!(s.skipped_count(), 1);
        assert!(!s.is_successful());
    }

    #[test]
    fn test_run_record() {
        let mut s = summary().with_duration(Duration::from_millis(1500));
        s.push(AssetOutcome::skipped(AssetKey::CsvExport, "upstream".into()));

        let record = s.to_run_record();
        assert_eq!(record.run_id, Uuid::nil().to_string());
        assert_eq!(record.snapshot_date, "2024-01-01 00:00:00.000000");
        assert_eq!(record.status, "failed");
        assert_eq!(record.skipped, 1);
        assert_eq!(record.duration_ms, 1500);
    }
}
