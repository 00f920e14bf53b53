//! Per-run context handed to every asset

use crate::config::OrderflowConfig;
use crate::domain::SnapshotDate;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Resolved configuration plus the identity of the current run
///
/// All assets of one run share the same `snapshot`, so the orders and line
/// items written by one run carry one `snapshot_date`.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Arc<OrderflowConfig>,
    pub run_id: Uuid,
    pub snapshot: SnapshotDate,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(config: Arc<OrderflowConfig>) -> Self {
        Self::with_snapshot(config, SnapshotDate::now())
    }

    pub fn with_snapshot(config: Arc<OrderflowConfig>, snapshot: SnapshotDate) -> Self {
        Self {
            config,
            run_id: Uuid::new_v4(),
            snapshot,
            started_at: Utc::now(),
        }
    }
}
