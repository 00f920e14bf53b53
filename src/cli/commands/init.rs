//! Init command implementation
//!
//! Writes a sample configuration file and bootstraps the database file with
//! the run history table, so that `database_check` passes on a fresh setup.

use crate::adapters::duckdb::DuckDbStore;
use crate::config::loader::database_path_override;
use crate::config::OrderflowConfig;
use crate::domain::errors::{EXIT_CONFIGURATION, EXIT_FATAL};
use crate::domain::Result;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "orderflow.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,

    /// Only write the configuration file
    #[arg(long)]
    pub skip_database: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing orderflow configuration");
        println!();

        let output = Path::new(&self.output);
        if output.exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIGURATION);
        }

        let content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if let Err(e) = fs::write(output, content) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(EXIT_FATAL);
        }
        println!("✅ Configuration file created: {}", self.output);

        if !self.skip_database {
            let db_path = &bootstrap_path(output, database_path_override())?;

            match bootstrap_database(db_path) {
                Ok(tables) => {
                    println!(
                        "✅ Database ready: {} ({tables} table(s))",
                        db_path.display()
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, path = %db_path.display(), "Database bootstrap failed");
                    println!("❌ Failed to bootstrap database {}", db_path.display());
                    println!("   Error: {e}");
                    return Ok(e.exit_code());
                }
            }
        }

        println!();
        println!("Next steps:");
        println!("  1. Create a .env file with your Shopify credentials:");
        println!("     - SHOPIFY_API_URL (e.g. your-store.myshopify.com)");
        println!("     - SHOPIFY_API_VERSION (e.g. 2024-10)");
        println!("     - SHOPIFY_API_KEY (Admin API access token)");
        println!("  2. Optionally set expected_store_name in {}", self.output);
        println!("  3. Validate configuration: orderflow validate-config");
        println!("  4. Check connectivity: orderflow check");
        println!("  5. Run the pipeline: orderflow run");
        println!();
        Ok(0)
    }
}

/// Create the database file and the run history table
///
/// Returns the number of tables in the catalog afterwards.
pub fn bootstrap_database(path: &Path) -> Result<usize> {
    let store = DuckDbStore::open(path)?;
    let tables = store
        .ensure_run_history()
        .and_then(|_| store.catalog_entries())
        .map(|entries| entries.len());
    store.close()?;
    tables
}

/// Database file for a configuration written to `output`
///
/// `env_override` replaces the default path; a relative path is resolved
/// against the directory of `output`, as `load_config` does.
fn bootstrap_path(output: &Path, env_override: Option<PathBuf>) -> std::io::Result<PathBuf> {
    let mut config = OrderflowConfig::default();
    if let Some(path) = env_override {
        config.database.path = path;
    }
    config.resolve_paths(&config_base_dir(output)?);
    Ok(config.database.path)
}

fn config_base_dir(output: &Path) -> std::io::Result<PathBuf> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if parent.is_absolute() {
        Ok(parent)
    } else {
        Ok(std::env::current_dir()?.join(parent))
    }
}

fn generate_minimal_config() -> String {
    r#"# Orderflow Configuration File
# Shopify orders -> DuckDB -> CSV

[application]
log_level = "info"

[shopify]
store_url = "${SHOPIFY_API_URL}"
api_version = "${SHOPIFY_API_VERSION}"
api_key = "${SHOPIFY_API_KEY}"
# expected_store_name = "My Store"

[database]
path = "duckdb_database/database.db"
schema = "entities"

[export]
output_path = "extracted_data_for_parabola/shopify_order_line_items_raw_data.csv"
line_item_scope = "all_orders"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
    .to_string()
}

fn generate_config_with_examples() -> String {
    r#"# Orderflow Configuration File
# Shopify orders -> DuckDB -> CSV
#
# ${VAR} placeholders are replaced from the environment (and .env) before
# parsing. Relative paths are resolved against the directory of this file.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
log_level = "info"

# ============================================================================
# Shopify Admin API
# ============================================================================
[shopify]
# Store host, e.g. "your-store.myshopify.com". A bare host is reached over https.
store_url = "${SHOPIFY_API_URL}"

# Admin API version: YYYY-MM or "unstable"
api_version = "${SHOPIFY_API_VERSION}"

# Admin API access token, sent as X-Shopify-Access-Token
api_key = "${SHOPIFY_API_KEY}"

# If set, api_check fails unless shop.json reports exactly this store name
# expected_store_name = "My Store"

# Request timeout in seconds
timeout_seconds = 30

# Orders per page (1-250)
page_size = 250

# Maximum pages followed through Link: rel="next" headers
max_pages = 10

# Order status filter: open | closed | cancelled | any
# order_status = "any"

# ============================================================================
# DuckDB
# ============================================================================
[database]
# Database file. orderflow init creates it; runs never do.
path = "duckdb_database/database.db"

# Schema holding both entity tables
schema = "entities"
orders_table = "shopify_orders"
line_items_table = "shopify_order_line_items"

# ============================================================================
# CSV Export
# ============================================================================
[export]
# Overwritten on every run
output_path = "extracted_data_for_parabola/shopify_order_line_items_raw_data.csv"

# Which orders contribute line items: all_orders | first_order
line_item_scope = "all_orders"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
    .to_string()
}
