//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional
//! JSON file layer with rotation.
//!
//! # Example
//!
//! ```no_run
//! use orderflow::config::LoggingConfig;
//! use orderflow::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(asset = "csv_export", rows = 42, "Asset materialized");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an asset materialization
///
/// # Example
///
/// ```no_run
/// use orderflow::log_asset_start;
/// use orderflow::core::assets::AssetKey;
///
/// log_asset_start!(AssetKey::ApiCheck);
/// ```
#[macro_export]
macro_rules! log_asset_start {
    ($asset:expr) => {
        tracing::info!(asset = %$asset, "Materializing asset");
    };
}

/// Log a materialized asset with its message and duration
///
/// # Example
///
/// ```no_run
/// use orderflow::log_asset_complete;
/// use orderflow::core::assets::AssetKey;
/// use std::time::Duration;
///
/// log_asset_complete!(AssetKey::CsvExport, "42 rows exported", Duration::from_millis(120));
/// ```
#[macro_export]
macro_rules! log_asset_complete {
    ($asset:expr, $message:expr, $duration:expr) => {
        tracing::info!(
            asset = %$asset,
            detail = %$message,
            duration_ms = $duration.as_millis() as u64,
            "Asset materialized"
        );
    };
}

/// Log a failed asset with the error
///
/// # Example
///
/// ```no_run
/// use orderflow::log_asset_failed;
/// use orderflow::core::assets::AssetKey;
/// use orderflow::domain::PipelineError;
/// use std::time::Duration;
///
/// let error = PipelineError::Connectivity("no tables".to_string());
/// log_asset_failed!(AssetKey::DatabaseCheck, &error, Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_asset_failed {
    ($asset:expr, $error:expr, $duration:expr) => {
        tracing::error!(
            asset = %$asset,
            error = %$error,
            duration_ms = $duration.as_millis() as u64,
            "Asset failed"
        );
    };
}
