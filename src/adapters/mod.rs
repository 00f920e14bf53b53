//! External system integrations for orderflow.
//!
//! - [`shopify`] - Shopify Admin REST API client
//! - [`duckdb`] - local DuckDB store (tables, loads, CSV export, run history)
//!
//! Adapters translate their library errors into
//! [`ShopifyError`](crate::domain::ShopifyError) and
//! [`DatabaseError`](crate::domain::DatabaseError), so `reqwest` and `duckdb`
//! types stay inside this module.
//!
//! # Example
//!
//! ```rust,no_run
//! use orderflow::adapters::duckdb::DuckDbStore;
//! use orderflow::adapters::shopify::ShopifyClient;
//! use orderflow::config::ShopifyConfig;
//! use std::path::Path;
//!
//! # async fn example() -> orderflow::domain::Result<()> {
//! let client = ShopifyClient::new(&ShopifyConfig::default())?;
//! let orders = client.fetch_orders().await?;
//!
//! let store = DuckDbStore::open_existing(Path::new("duckdb_database/database.db"))?;
//! println!("{} orders, {} tables", orders.len(), store.catalog_entries()?.len());
//! store.close()?;
//! # Ok(())
//! # }
//! ```

pub mod duckdb;
pub mod shopify;
