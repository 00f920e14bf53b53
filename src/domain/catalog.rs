//! Catalog metadata rows

use serde::Serialize;
use std::fmt;

/// One row of DuckDB's `duckdb_tables()` listing
///
/// Only used to check that the database file is the one the pipeline expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub database_name: String,
    pub schema_name: String,
    pub table_name: String,
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.database_name, self.schema_name, self.table_name
        )
    }
}
