//! Domain models and types for orderflow.
//!
//! - **Records** ([`Order`], [`LineItem`]) as untyped JSON maps
//! - **Tables** ([`FlatTable`], [`TableRef`]) handed to the DuckDB store
//! - **Snapshots** ([`SnapshotDate`]) that version persisted rows
//! - **Errors** ([`PipelineError`], [`ShopifyError`], [`DatabaseError`])
//!
//! All fallible operations return [`Result<T>`](Result).

pub mod catalog;
pub mod errors;
pub mod order;
pub mod result;
pub mod snapshot;
pub mod table;

pub use catalog::CatalogEntry;
pub use errors::{DatabaseError, PipelineError, ShopifyError};
pub use order::{LineItem, Order};
pub use result::Result;
pub use snapshot::{SnapshotDate, SNAPSHOT_COLUMN};
pub use table::{Column, ColumnType, FlatTable, TableRef, ID_COLUMN};
