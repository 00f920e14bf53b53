//! CSV export of the line-items table

use super::{Asset, AssetKey, Materialization};
use crate::adapters::duckdb::{write_header_only_csv, DuckDbStore};
use crate::core::pipeline::RunContext;
use crate::core::transform::ORDER_ID_COLUMN;
use crate::domain::{DatabaseError, PipelineError, Result, ID_COLUMN, SNAPSHOT_COLUMN};
use async_trait::async_trait;

/// Header written when no line item has ever been loaded
pub const EMPTY_EXPORT_COLUMNS: [&str; 3] = [ID_COLUMN, ORDER_ID_COLUMN, SNAPSHOT_COLUMN];

pub struct CsvExport;

#[async_trait]
impl Asset for CsvExport {
    fn key(&self) -> AssetKey {
        AssetKey::CsvExport
    }

    fn deps(&self) -> &[AssetKey] {
        &[AssetKey::OrdersExtractLoad]
    }

    async fn materialize(&self, ctx: &RunContext) -> Result<Materialization> {
        let table = ctx.config.database.line_items_ref();
        let output = &ctx.config.export.output_path;

        let store = DuckDbStore::open_existing(&ctx.config.database.path)?;
        let exported = store.export_csv(&table, output);
        store.close()?;

        let rows = match exported {
            Ok(rows) => rows,
            Err(PipelineError::Database(DatabaseError::TableNotFound(_))) => {
                tracing::warn!(
                    table = %table,
                    path = %output.display(),
                    "Table does not exist yet, writing header-only CSV"
                );
                write_header_only_csv(output, &EMPTY_EXPORT_COLUMNS)?;
                0
            }
            Err(e) => return Err(e),
        };

        tracing::info!(table = %table, rows, path = %output.display(), "Exported CSV");

        Ok(
            Materialization::new(format!("{rows} row(s) written to {}", output.display()))
                .with_metadata("rows", rows)
                .with_metadata("path", output.display()),
        )
    }
}
