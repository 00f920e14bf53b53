//! Order extraction and load
//!
//! Fetches orders, flattens them into the orders and line-items tables and
//! upserts both under the run's snapshot.

use super::{Asset, AssetKey, Materialization};
use crate::adapters::duckdb::DuckDbStore;
use crate::adapters::shopify::ShopifyClient;
use crate::core::pipeline::RunContext;
use crate::core::transform::{line_items_table, orders_table};
use crate::domain::{FlatTable, Result, TableRef, ID_COLUMN};
use async_trait::async_trait;

pub struct OrdersExtractLoad;

/// Result of loading one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: TableRef,

    /// Rows inserted or replaced
    pub rows_written: usize,

    /// Rows dropped because an earlier row in the batch had the same id
    pub duplicates_skipped: usize,

    /// Batch columns the existing table does not have
    pub columns_dropped: Vec<String>,

    /// The batch was empty and the database was not touched
    pub skipped: bool,
}

impl LoadReport {
    fn skipped(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            rows_written: 0,
            duplicates_skipped: 0,
            columns_dropped: Vec::new(),
            skipped: true,
        }
    }
}

#[async_trait]
impl Asset for OrdersExtractLoad {
    fn key(&self) -> AssetKey {
        AssetKey::OrdersExtractLoad
    }

    fn deps(&self) -> &[AssetKey] {
        &[AssetKey::DatabaseCheck, AssetKey::ApiCheck]
    }

    async fn materialize(&self, ctx: &RunContext) -> Result<Materialization> {
        let config = &ctx.config;

        let client = ShopifyClient::new(&config.shopify)?;
        let orders = client.fetch_orders().await?;

        let orders_rows = orders_table(&orders, ctx.snapshot)?;
        let line_item_rows =
            line_items_table(&orders, config.export.line_item_scope, ctx.snapshot)?;

        tracing::info!(
            orders = orders_rows.len(),
            line_items = line_item_rows.len(),
            scope = %config.export.line_item_scope,
            snapshot = %ctx.snapshot,
            "Flattened orders"
        );

        let mut store = DuckDbStore::open_existing(&config.database.path)?;
        let loaded = load_table(&mut store, &config.database.orders_ref(), orders_rows).and_then(
            |orders_report| {
                load_table(&mut store, &config.database.line_items_ref(), line_item_rows)
                    .map(|items_report| (orders_report, items_report))
            },
        );
        store.close()?;
        let (orders_report, items_report) = loaded?;

        Ok(Materialization::new(format!(
            "{} order row(s), {} line item row(s) at snapshot {}",
            orders_report.rows_written, items_report.rows_written, ctx.snapshot
        ))
        .with_metadata("orders_fetched", orders.len())
        .with_metadata("orders_rows", orders_report.rows_written)
        .with_metadata("line_items_rows", items_report.rows_written)
        .with_metadata(
            "duplicates_skipped",
            orders_report.duplicates_skipped + items_report.duplicates_skipped,
        )
        .with_metadata(
            "columns_dropped",
            dropped_columns(&[&orders_report, &items_report]),
        )
        .with_metadata("snapshot_date", ctx.snapshot))
    }
}

/// `table.column` for every dropped column, comma separated
fn dropped_columns(reports: &[&LoadReport]) -> String {
    reports
        .iter()
        .flat_map(|report| {
            report
                .columns_dropped
                .iter()
                .map(move |column| format!("{}.{column}", report.table.table))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create-if-absent the schema and table, then upsert `rows`
///
/// An empty batch is skipped without touching the database, so a run that
/// fetched nothing does not create tables with no columns.
pub fn load_table(store: &mut DuckDbStore, table: &TableRef, mut rows: FlatTable) -> Result<LoadReport> {
    if rows.is_empty() {
        tracing::info!(table = %table, "No rows to load, skipping table");
        return Ok(LoadReport::skipped(table));
    }

    let duplicates_skipped = rows.dedup_by(ID_COLUMN);
    if duplicates_skipped > 0 {
        tracing::warn!(
            table = %table,
            duplicates = duplicates_skipped,
            "Duplicate ids in batch, keeping the last occurrence"
        );
    }

    store.create_schema_if_not_exists(&table.schema)?;
    if !store.ensure_table(table, &rows)? {
        store.ensure_primary_key(table)?;
    }

    let upsert = store.upsert(table, &rows)?;

    tracing::info!(
        table = %table,
        rows = upsert.rows_written,
        duplicates_skipped,
        "Loaded table"
    );

    Ok(LoadReport {
        table: table.clone(),
        rows_written: upsert.rows_written,
        duplicates_skipped,
        columns_dropped: upsert.columns_dropped,
        skipped: false,
    })
}
