//! Pipeline orchestration
//!
//! - [`graph`] - dependency validation and execution planning
//! - [`runner`] - sequential execution with downstream skipping
//! - [`context`] - run id, snapshot and configuration shared by assets
//! - [`summary`] - per-asset outcomes and run totals

pub mod context;
pub mod graph;
pub mod runner;
pub mod summary;

pub use context::RunContext;
pub use graph::AssetGraph;
pub use runner::PipelineRunner;
pub use summary::{AssetOutcome, AssetStatus, RunSummary};
