//! Core business logic for orderflow.
//!
//! - [`assets`] - the four pipeline assets and the [`Asset`](assets::Asset) trait
//! - [`pipeline`] - dependency planning and sequential execution
//! - [`transform`] - flattening orders and line items into tables
//!
//! # Example
//!
//! ```rust,no_run
//! use orderflow::config::load_config;
//! use orderflow::core::assets::AssetKey;
//! use orderflow::core::pipeline::PipelineRunner;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(load_config("orderflow.toml")?);
//! let runner = PipelineRunner::with_default_assets()?;
//!
//! // Only the two reachability checks
//! let summary = runner
//!     .run(config, &[AssetKey::DatabaseCheck, AssetKey::ApiCheck])
//!     .await?;
//!
//! println!("Materialized: {}", summary.materialized_count());
//! println!("Failed: {}", summary.failed_count());
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod pipeline;
pub mod transform;
