//! CSV export of the line-items table

use orderflow::adapters::duckdb::DuckDbStore;
use orderflow::cli::commands::init::bootstrap_database;
use orderflow::config::{LineItemScope, OrderflowConfig};
use orderflow::core::assets::extract_load::load_table;
use orderflow::core::assets::{Asset, CsvExport};
use orderflow::core::pipeline::RunContext;
use orderflow::core::transform::line_items_table;
use orderflow::domain::{Order, SnapshotDate};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

fn config_in(dir: &Path) -> OrderflowConfig {
    let mut config = OrderflowConfig::default();
    config.database.path = dir.join("database.db");
    config.export.output_path = dir.join("out").join("line_items.csv");
    config
}

fn load_items(config: &OrderflowConfig, orders: serde_json::Value, at: &str) {
    let orders: Vec<Order> = serde_json::from_value(orders).unwrap();
    let snapshot = SnapshotDate::from_str(at).unwrap();
    let mut store = DuckDbStore::open_existing(&config.database.path).unwrap();
    let rows = line_items_table(&orders, LineItemScope::AllOrders, snapshot).unwrap();
    load_table(&mut store, &config.database.line_items_ref(), rows).unwrap();
    store.close().unwrap();
}

async fn export(config: &OrderflowConfig) -> orderflow::domain::Result<usize> {
    let ctx = RunContext::new(Arc::new(config.clone()));
    let done = CsvExport.materialize(&ctx).await?;
    Ok(done.metadata_value("rows").unwrap().parse().unwrap())
}

#[tokio::test]
async fn test_export_matches_table_rows_and_columns() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    bootstrap_database(&config.database.path).unwrap();
    load_items(
        &config,
        json!([
            {"id": 10, "line_items": [
                {"id": 1, "title": "Wool hat, grey", "price_set": {"shop_money": {"amount": "10.00"}}},
                {"id": 2, "title": "Scarf", "price_set": {"shop_money": {"amount": "20.00"}}}
            ]}
        ]),
        "2024-06-01 08:00:00",
    );

    let rows = export(&config).await.unwrap();
    assert_eq!(rows, 2);

    let content = fs::read_to_string(&config.export.output_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);

    let store = DuckDbStore::open_existing(&config.database.path).unwrap();
    let columns = store
        .table_columns(&config.database.line_items_ref())
        .unwrap();
    store.close().unwrap();

    assert_eq!(lines[0], columns.join(","));
    assert!(content.contains("\"Wool hat, grey\""));
}

#[tokio::test]
async fn test_export_overwrites_previous_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    bootstrap_database(&config.database.path).unwrap();
    fs::create_dir_all(config.export.output_path.parent().unwrap()).unwrap();
    fs::write(&config.export.output_path, "stale\nstale\nstale\nstale\nstale\n").unwrap();

    load_items(
        &config,
        json!([{"id": 10, "line_items": [{"id": 1, "sku": "HAT"}]}]),
        "2024-06-01 08:00:00",
    );
    assert_eq!(export(&config).await.unwrap(), 1);

    load_items(
        &config,
        json!([{"id": 10, "line_items": [{"id": 1, "sku": "HAT"}]}]),
        "2024-06-02 08:00:00",
    );
    assert_eq!(export(&config).await.unwrap(), 2);

    let content = fs::read_to_string(&config.export.output_path).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(!content.contains("stale"));

    let leftovers: Vec<_> = fs::read_dir(config.export.output_path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_export_without_table_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    bootstrap_database(&config.database.path).unwrap();

    let rows = export(&config).await.unwrap();

    assert_eq!(rows, 0);
    assert_eq!(
        fs::read_to_string(&config.export.output_path).unwrap(),
        "id,order_id,snapshot_date\n"
    );
}
