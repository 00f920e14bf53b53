//! Configuration schema types
//!
//! This module defines the configuration structure for orderflow.

use crate::config::{secret_string, SecretString};
use crate::domain::TableRef;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Which orders contribute rows to the line-items table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineItemScope {
    /// Line items of every fetched order
    #[default]
    AllOrders,
    /// Line items of the first fetched order only
    FirstOrder,
}

impl fmt::Display for LineItemScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineItemScope::AllOrders => write!(f, "all_orders"),
            LineItemScope::FirstOrder => write!(f, "first_order"),
        }
    }
}

impl FromStr for LineItemScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_orders" => Ok(LineItemScope::AllOrders),
            "first_order" => Ok(LineItemScope::FirstOrder),
            other => Err(format!(
                "Invalid line_item_scope '{other}'. Must be one of: all_orders, first_order"
            )),
        }
    }
}

/// Main orderflow configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section has defaults so that a configuration can be assembled from
/// environment variables alone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderflowConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Shopify Admin API settings
    #[serde(default)]
    pub shopify: ShopifyConfig,

    /// Local DuckDB database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OrderflowConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.shopify.validate()?;
        self.database.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Make every relative path absolute against `base_dir`
    ///
    /// Called once at load time so that no later step depends on the
    /// process working directory.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        self.database.path = absolutize(&self.database.path, base_dir);
        self.export.output_path = absolutize(&self.export.output_path, base_dir);
        self.logging.local_path = absolutize(&self.logging.local_path, base_dir);
    }
}

fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Shopify Admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    /// Store host (`my-store.myshopify.com`), optionally with a scheme
    #[serde(default)]
    pub store_url: String,

    /// Admin API version, e.g. `2024-10`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Admin API access token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,

    /// Store name the identity check must report (optional)
    #[serde(default)]
    pub expected_store_name: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Orders requested per page (`limit` query parameter)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum number of pages followed through `Link` headers
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Order status filter (`status` query parameter)
    #[serde(default)]
    pub order_status: Option<String>,
}

impl ShopifyConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.store_url.trim().is_empty() {
            return Err(
                "shopify.store_url cannot be empty (set SHOPIFY_API_URL or shopify.store_url)"
                    .to_string(),
            );
        }

        if self.api_key.expose_secret().is_empty() {
            return Err(
                "shopify.api_key cannot be empty (set SHOPIFY_API_KEY or shopify.api_key)"
                    .to_string(),
            );
        }

        if !api_version_pattern().is_match(&self.api_version) {
            return Err(format!(
                "Invalid shopify.api_version '{}'. Expected YYYY-MM or 'unstable'",
                self.api_version
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("shopify.timeout_seconds must be greater than 0".to_string());
        }

        if !(1..=250).contains(&self.page_size) {
            return Err(format!(
                "shopify.page_size must be between 1 and 250, got {}",
                self.page_size
            ));
        }

        if self.max_pages == 0 {
            return Err("shopify.max_pages must be at least 1".to_string());
        }

        if let Some(status) = &self.order_status {
            let valid_statuses = ["open", "closed", "cancelled", "any"];
            if !valid_statuses.contains(&status.as_str()) {
                return Err(format!(
                    "Invalid shopify.order_status '{}'. Must be one of: {}",
                    status,
                    valid_statuses.join(", ")
                ));
            }
        }

        Ok(())
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            api_version: default_api_version(),
            api_key: empty_secret(),
            expected_store_name: None,
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            order_status: None,
        }
    }
}

/// Local DuckDB database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Schema holding the entity tables
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Orders table name
    #[serde(default = "default_orders_table")]
    pub orders_table: String,

    /// Line items table name
    #[serde(default = "default_line_items_table")]
    pub line_items_table: String,
}

impl DatabaseConfig {
    pub fn orders_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.orders_table)
    }

    pub fn line_items_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.line_items_table)
    }

    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("database.path cannot be empty".to_string());
        }

        for (field, value) in [
            ("database.schema", &self.schema),
            ("database.orders_table", &self.orders_table),
            ("database.line_items_table", &self.line_items_table),
        ] {
            if !identifier_pattern().is_match(value) {
                return Err(format!(
                    "Invalid {field} '{value}'. Must be a plain SQL identifier"
                ));
            }
        }

        if self.orders_table == self.line_items_table {
            return Err(
                "database.orders_table and database.line_items_table must differ".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            schema: default_schema(),
            orders_table: default_orders_table(),
            line_items_table: default_line_items_table(),
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination of the line items CSV
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Which orders contribute line items
    #[serde(default)]
    pub line_item_scope: LineItemScope,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_path.as_os_str().is_empty() {
            return Err("export.output_path cannot be empty".to_string());
        }
        if self.output_path.file_name().is_none() {
            return Err(format!(
                "export.output_path '{}' must name a file",
                self.output_path.display()
            ));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            line_item_scope: LineItemScope::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// Rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.as_os_str().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn api_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-(0[1-9]|1[0-2])|unstable)$").expect("api version pattern is valid")
    })
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

fn empty_secret() -> SecretString {
    secret_string(String::new())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_version() -> String {
    "2024-10".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> u32 {
    250
}

fn default_max_pages() -> u32 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("duckdb_database/database.db")
}

fn default_schema() -> String {
    "entities".to_string()
}

fn default_orders_table() -> String {
    "shopify_orders".to_string()
}

fn default_line_items_table() -> String {
    "shopify_order_line_items".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("extracted_data_for_parabola/shopify_order_line_items_raw_data.csv")
}

fn default_local_path() -> PathBuf {
    PathBuf::from("logs")
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
