//! CLI command implementations
//!
//! Every command returns the process exit code.

pub mod check;
pub mod init;
pub mod run;
pub mod status;
pub mod validate;

use crate::config::{load_config, OrderflowConfig};

/// Load the configuration, printing the error and its exit code on failure
fn load_or_report(config_path: &str) -> Result<OrderflowConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
        println!("❌ Failed to load configuration: {config_path}");
        println!("   Error: {e}");
        e.exit_code()
    })
}
