//! Configuration management for orderflow.
//!
//! TOML configuration with `${VAR}` substitution, environment overrides and
//! validation. When the configuration file does not exist the pipeline runs
//! from defaults plus the environment, so a `.env` file with the three
//! `SHOPIFY_API_*` variables is enough to get started.
//!
//! # Example Configuration
//!
//! ```toml
//! [shopify]
//! store_url = "${SHOPIFY_API_URL}"
//! api_version = "${SHOPIFY_API_VERSION}"
//! api_key = "${SHOPIFY_API_KEY}"
//! expected_store_name = "No Name Business 123"
//!
//! [database]
//! path = "duckdb_database/database.db"
//!
//! [export]
//! output_path = "extracted_data_for_parabola/shopify_order_line_items_raw_data.csv"
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file at load time.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, ExportConfig, LineItemScope, LoggingConfig,
    OrderflowConfig, ShopifyConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
