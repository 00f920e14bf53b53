//! Data transformation logic
//!
//! Turns fetched orders into the two [`FlatTable`](crate::domain::FlatTable)s
//! that get loaded into DuckDB.

pub mod flatten;

pub use flatten::{line_items_table, normalize_record, orders_table, ORDER_ID_COLUMN};
