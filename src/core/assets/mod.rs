//! Pipeline assets
//!
//! An asset is one named unit of work with declared upstream dependencies.
//! The four assets form a chain:
//!
//! ```text
//! database_check ──┐
//!                  ├──> orders_extract_load ──> csv_export
//! api_check ───────┘
//! ```

pub mod api_check;
pub mod csv_export;
pub mod database_check;
pub mod extract_load;

pub use api_check::ApiCheck;
pub use csv_export::CsvExport;
pub use database_check::DatabaseCheck;
pub use extract_load::{LoadReport, OrdersExtractLoad};

use crate::core::pipeline::RunContext;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stable asset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    DatabaseCheck,
    ApiCheck,
    OrdersExtractLoad,
    CsvExport,
}

impl AssetKey {
    pub const ALL: [AssetKey; 4] = [
        AssetKey::DatabaseCheck,
        AssetKey::ApiCheck,
        AssetKey::OrdersExtractLoad,
        AssetKey::CsvExport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKey::DatabaseCheck => "database_check",
            AssetKey::ApiCheck => "api_check",
            AssetKey::OrdersExtractLoad => "orders_extract_load",
            AssetKey::CsvExport => "csv_export",
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        AssetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = AssetKey::ALL.iter().map(AssetKey::as_str).collect();
                PipelineError::Configuration(format!(
                    "Unknown asset '{s}'. Expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// What a successful materialization reports back
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Materialization {
    /// One-line human readable result
    pub message: String,

    /// Named counts and values, in insertion order
    pub metadata: Vec<(String, String)>,
}

impl Materialization {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push((key.into(), value.to_string()));
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A unit of work in the pipeline
#[async_trait]
pub trait Asset: Send + Sync {
    fn key(&self) -> AssetKey;

    /// Assets that must materialize before this one
    fn deps(&self) -> &[AssetKey];

    async fn materialize(&self, ctx: &RunContext) -> Result<Materialization>;
}

/// The four pipeline assets in registration order
pub fn default_assets() -> Vec<Box<dyn Asset>> {
    vec![
        Box::new(DatabaseCheck),
        Box::new(ApiCheck),
        Box::new(OrdersExtractLoad),
        Box::new(CsvExport),
    ]
}
