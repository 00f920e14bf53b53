//! DuckDB adapter
//!
//! Schema and table management, idempotent snapshot loads, CSV export and
//! the optional run history table.

pub mod history;
pub mod store;

pub use history::{RunRecord, HISTORY_SCHEMA, HISTORY_TABLE};
pub use store::{write_header_only_csv, DuckDbStore, UpsertReport};
