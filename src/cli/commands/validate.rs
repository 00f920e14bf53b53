//! Validate config command implementation

use super::load_or_report;
use crate::config::OrderflowConfig;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary_lines(&config) {
            println!("{line}");
        }
        println!();
        Ok(0)
    }
}

/// Human readable configuration summary with the API key redacted
pub(crate) fn summary_lines(config: &OrderflowConfig) -> Vec<String> {
    let key = config.shopify.api_key.expose_secret();
    let key_state = if key.is_empty() {
        "(not set)".to_string()
    } else {
        format!("******** ({} chars)", key.as_ref().len())
    };

    vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Store URL: {}", config.shopify.store_url),
        format!("  API Version: {}", config.shopify.api_version),
        format!("  API Key: {key_state}"),
        format!(
            "  Expected Store Name: {}",
            config
                .shopify
                .expected_store_name
                .as_deref()
                .unwrap_or("(any)")
        ),
        format!(
            "  Page Size / Max Pages: {} / {}",
            config.shopify.page_size, config.shopify.max_pages
        ),
        format!("  Database: {}", config.database.path.display()),
        format!("  Orders Table: {}", config.database.orders_ref()),
        format!("  Line Items Table: {}", config.database.line_items_ref()),
        format!("  CSV Output: {}", config.export.output_path.display()),
        format!("  Line Item Scope: {}", config.export.line_item_scope),
    ]
}
