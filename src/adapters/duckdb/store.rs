//! DuckDB store for the entity tables
//!
//! Each asset opens its own [`DuckDbStore`], does its work and closes it
//! again; no connection outlives an asset.

use crate::domain::table::quote_ident;
use crate::domain::{
    CatalogEntry, ColumnType, DatabaseError, FlatTable, PipelineError, Result, TableRef,
    ID_COLUMN, SNAPSHOT_COLUMN,
};
use ::duckdb::types::Value as DuckValue;
use ::duckdb::{params, params_from_iter, Connection};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of loading one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// Rows inserted or replaced
    pub rows_written: usize,

    /// Batch columns the existing table does not have
    pub columns_dropped: Vec<String>,
}

/// Connection to the local DuckDB file
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open (or create) the database at `path`
    ///
    /// The parent directory is created if needed. Use this only where
    /// creating a fresh database is intended; pipeline assets use
    /// [`DuckDbStore::open_existing`].
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {e}", path.display())))?;
        Ok(Self { conn })
    }

    /// Open the database at `path`, failing if the file does not exist
    ///
    /// DuckDB would silently create an empty database for a wrong path, so
    /// the file must already be there.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::Connectivity(format!(
                "Database file not found: {}",
                path.display()
            )));
        }
        Self::open(path)
    }

    /// In-memory database, for tests and dry experiments
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Close the connection, surfacing any error from DuckDB
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| DatabaseError::ConnectionFailed(e.to_string()).into())
    }

    /// Rows of `duckdb_tables()`
    pub fn catalog_entries(&self) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT database_name, schema_name, table_name FROM duckdb_tables() \
             ORDER BY database_name, schema_name, table_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CatalogEntry {
                database_name: row.get(0)?,
                schema_name: row.get(1)?,
                table_name: row.get(2)?,
            })
        })?;
        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    /// Run arbitrary SQL statements
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn create_schema_if_not_exists(&self, schema: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        Ok(())
    }

    pub fn relation_exists(&self, table: &TableRef) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            params![table.schema, table.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names in table order
    pub fn table_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        Ok(self
            .table_column_types(table)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// `(column_name, data_type)` pairs in table order
    pub fn table_column_types(&self, table: &TableRef) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )?;
        let rows = stmt.query_map(params![table.schema, table.table], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        let mut columns = Vec::new();
        for column in rows {
            columns.push(column?);
        }
        Ok(columns)
    }

    pub fn has_primary_key(&self, table: &TableRef) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM duckdb_constraints() \
             WHERE schema_name = ? AND table_name = ? AND constraint_type = 'PRIMARY KEY'",
            params![table.schema, table.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create the table with a `(id, snapshot_date)` primary key if absent
    ///
    /// Column names and types come from `layout`. Returns `true` when the
    /// table was created.
    pub fn ensure_table(&self, table: &TableRef, layout: &FlatTable) -> Result<bool> {
        require_key_columns(table, &layout.column_names())?;

        if self.relation_exists(table)? {
            return Ok(false);
        }

        let columns: Vec<String> = layout
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_name()))
            .collect();

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} ({}, PRIMARY KEY ({}, {}))",
            table.quoted(),
            columns.join(", "),
            quote_ident(ID_COLUMN),
            quote_ident(SNAPSHOT_COLUMN)
        );
        tracing::debug!(table = %table, sql = %ddl, "Creating table");
        self.conn.execute_batch(&ddl)?;
        Ok(true)
    }

    /// Add the `(id, snapshot_date)` primary key unless one already exists
    ///
    /// Returns `true` when the constraint was added.
    pub fn ensure_primary_key(&self, table: &TableRef) -> Result<bool> {
        if self.has_primary_key(table)? {
            return Ok(false);
        }

        require_key_columns(table, &self.table_columns(table)?)?;

        let sql = format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({}, {})",
            table.quoted(),
            quote_ident(ID_COLUMN),
            quote_ident(SNAPSHOT_COLUMN)
        );
        self.conn.execute_batch(&sql).map_err(|e| {
            DatabaseError::ConstraintFailed(format!("Failed to add primary key to {table}: {e}"))
        })?;
        tracing::info!(table = %table, "Added primary key (id, snapshot_date)");
        Ok(true)
    }

    /// Insert or replace every row of `rows` in one transaction
    ///
    /// Only columns the table already has are written; the rest are reported
    /// in [`UpsertReport::columns_dropped`]. Cells are checked against the
    /// stored column types first, so a value the column cannot hold as-is
    /// fails the load before anything is written.
    pub fn upsert(&mut self, table: &TableRef, rows: &FlatTable) -> Result<UpsertReport> {
        let existing = self.table_column_types(table)?;
        if existing.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()).into());
        }

        // (batch index, stored type) per written column
        let mut kept: Vec<(usize, Option<ColumnType>)> = Vec::new();
        let mut columns_dropped = Vec::new();
        for (idx, column) in rows.columns().iter().enumerate() {
            match existing.iter().find(|(name, _)| name == &column.name) {
                Some((_, data_type)) => kept.push((idx, ColumnType::from_sql_name(data_type))),
                None => columns_dropped.push(column.name.clone()),
            }
        }

        let kept_names: Vec<&str> = kept
            .iter()
            .map(|&(idx, _)| rows.columns()[idx].name.as_str())
            .collect();
        require_key_columns(table, &kept_names)?;

        for row in rows.rows() {
            for &(idx, stored) in &kept {
                let Some(stored) = stored else { continue };
                if !stored.accepts(&row[idx]) {
                    return Err(PipelineError::Validation(format!(
                        "Column '{}' of {table} is {} and cannot hold {}",
                        rows.columns()[idx].name,
                        stored.sql_name(),
                        row[idx]
                    )));
                }
            }
        }

        if !columns_dropped.is_empty() {
            tracing::warn!(
                table = %table,
                columns = ?columns_dropped,
                "Dropping columns not present in existing table"
            );
        }

        let column_list: Vec<String> = kept_names.iter().map(|name| quote_ident(name)).collect();
        let placeholders: Vec<&str> = kept
            .iter()
            .map(|&(_, stored)| match stored {
                Some(ColumnType::Timestamp) => "CAST(? AS TIMESTAMP)",
                _ => "?",
            })
            .collect();

        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            table.quoted(),
            column_list.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows.rows() {
                let values: Vec<DuckValue> = kept
                    .iter()
                    .map(|&(idx, stored)| to_duck_value(&row[idx], stored))
                    .collect();
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(UpsertReport {
            rows_written: rows.len(),
            columns_dropped,
        })
    }

    pub fn count_rows(&self, table: &TableRef) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.quoted()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Row count per snapshot, newest first
    pub fn snapshot_counts(&self, table: &TableRef, limit: usize) -> Result<Vec<(String, usize)>> {
        let sql = format!(
            "SELECT CAST({snap} AS VARCHAR), COUNT(*) FROM {table} \
             GROUP BY {snap} ORDER BY {snap} DESC LIMIT {limit}",
            snap = quote_ident(SNAPSHOT_COLUMN),
            table = table.quoted(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let snapshot: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((snapshot, count as usize))
        })?;
        let mut counts = Vec::new();
        for entry in rows {
            counts.push(entry?);
        }
        Ok(counts)
    }

    /// Write the whole table to `dest` as CSV with a header row
    ///
    /// The file is written next to `dest` first and renamed over it, so an
    /// existing file is replaced in one step. Returns the number of rows.
    pub fn export_csv(&self, table: &TableRef, dest: &Path) -> Result<usize> {
        if !self.relation_exists(table)? {
            return Err(DatabaseError::TableNotFound(table.to_string()).into());
        }

        let tmp = temp_path(dest)?;
        let rows = self.count_rows(table)?;
        let sql = format!(
            "COPY (SELECT * FROM {}) TO {} (FORMAT CSV, HEADER, DELIMITER ',')",
            table.quoted(),
            sql_string_literal(&tmp.to_string_lossy())
        );
        if let Err(e) = self.conn.execute_batch(&sql) {
            let _ = fs::remove_file(&tmp);
            return Err(PipelineError::Export(format!(
                "Failed to write {}: {e}",
                dest.display()
            )));
        }

        replace_file(&tmp, dest)?;
        Ok(rows)
    }

    /// Underlying connection, for ad-hoc queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Write a CSV holding only a header row, replacing `dest`
pub fn write_header_only_csv(dest: &Path, columns: &[&str]) -> Result<()> {
    let tmp = temp_path(dest)?;
    fs::write(&tmp, format!("{}\n", columns.join(","))).map_err(|e| {
        PipelineError::Export(format!("Failed to write {}: {e}", dest.display()))
    })?;
    replace_file(&tmp, dest)
}

/// Hidden sibling of `dest` used while writing; creates the parent directory
fn temp_path(dest: &Path) -> Result<PathBuf> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = dest
        .file_name()
        .ok_or_else(|| PipelineError::Export(format!("Not a file path: {}", dest.display())))?;
    Ok(dest.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}

fn replace_file(tmp: &Path, dest: &Path) -> Result<()> {
    fs::rename(tmp, dest).map_err(|e| {
        let _ = fs::remove_file(tmp);
        PipelineError::Export(format!("Failed to move CSV into {}: {e}", dest.display()))
    })
}

fn require_key_columns(table: &TableRef, columns: &[impl AsRef<str>]) -> Result<()> {
    for key in [ID_COLUMN, SNAPSHOT_COLUMN] {
        if !columns.iter().any(|c| c.as_ref() == key) {
            return Err(PipelineError::Validation(format!(
                "{table} rows have no '{key}' column"
            )));
        }
    }
    Ok(())
}

/// Bind a JSON cell for a column of type `stored`
///
/// Text columns get non-string cells as their JSON text.
fn to_duck_value(value: &Value, stored: Option<ColumnType>) -> DuckValue {
    match (value, stored) {
        (Value::Null, _) => DuckValue::Null,
        (Value::String(s), _) => DuckValue::Text(s.clone()),
        (other, Some(ColumnType::Varchar)) => DuckValue::Text(other.to_string()),
        (Value::Bool(b), _) => DuckValue::Boolean(*b),
        (Value::Number(n), Some(ColumnType::Double)) => {
            n.as_f64().map_or(DuckValue::Null, DuckValue::Double)
        }
        (Value::Number(n), _) => match n.as_i64() {
            Some(i) => DuckValue::BigInt(i),
            None => n.as_f64().map_or(DuckValue::Null, DuckValue::Double),
        },
        (other, _) => DuckValue::Text(other.to_string()),
    }
}

/// Single-quoted SQL string literal
pub(crate) fn sql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl From<::duckdb::Error> for DatabaseError {
    fn from(err: ::duckdb::Error) -> Self {
        // duckdb::Error carries no structured kind for these cases
        let msg = err.to_string();
        if msg.contains("Constraint Error") {
            DatabaseError::ConstraintFailed(msg)
        } else if msg.contains("Catalog Error") && msg.contains("does not exist") {
            DatabaseError::TableNotFound(msg)
        } else {
            DatabaseError::QueryFailed(msg)
        }
    }
}

impl From<::duckdb::Error> for PipelineError {
    fn from(err: ::duckdb::Error) -> Self {
        PipelineError::Database(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotDate;
    use serde_json::json;
    use std::str::FromStr;

    fn orders_ref() -> TableRef {
        TableRef::new("entities", "shopify_orders")
    }

    fn table(records: Value, snapshot: &str) -> FlatTable {
        let records = records
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect();
        FlatTable::from_records(records).with_snapshot(SnapshotDate::from_str(snapshot).unwrap())
    }

    fn load(store: &mut DuckDbStore, target: &TableRef, rows: &FlatTable) -> UpsertReport {
        store.create_schema_if_not_exists(&target.schema).unwrap();
        store.ensure_table(target, rows).unwrap();
        store.ensure_primary_key(target).unwrap();
        store.upsert(target, rows).unwrap()
    }

    #[test]
    fn test_catalog_empty_then_populated() {
        let store = DuckDbStore::in_memory().unwrap();
        assert!(store.catalog_entries().unwrap().is_empty());

        store
            .execute_batch("CREATE SCHEMA entities; CREATE TABLE entities.t (id INT)")
            .unwrap();
        let entries = store.catalog_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].schema_name, "entities");
        assert_eq!(entries[0].table_name, "t");
    }

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = DuckDbStore::open_existing(&dir.path().join("absent.db"))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Connectivity(_)));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_ensure_table_creates_primary_key() {
        let store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        let rows = table(json!([{"id": 1, "email": "a@example.com"}]), "2024-01-01 00:00:00");

        store.create_schema_if_not_exists("entities").unwrap();
        assert!(store.ensure_table(&target, &rows).unwrap());
        assert!(!store.ensure_table(&target, &rows).unwrap());
        assert!(store.has_primary_key(&target).unwrap());
        assert!(!store.ensure_primary_key(&target).unwrap());
        assert_eq!(
            store.table_columns(&target).unwrap(),
            vec!["id", "email", "snapshot_date"]
        );
    }

    #[test]
    fn test_ensure_primary_key_on_legacy_table() {
        let store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        store
            .execute_batch(
                "CREATE SCHEMA entities; \
                 CREATE TABLE entities.shopify_orders (id BIGINT, snapshot_date TIMESTAMP)",
            )
            .unwrap();

        assert!(!store.has_primary_key(&target).unwrap());
        assert!(store.ensure_primary_key(&target).unwrap());
        assert!(store.has_primary_key(&target).unwrap());
        assert!(!store.ensure_primary_key(&target).unwrap());
    }

    #[test]
    fn test_ensure_table_requires_id() {
        let store = DuckDbStore::in_memory().unwrap();
        store.create_schema_if_not_exists("entities").unwrap();
        let rows = table(json!([{"sku": "A"}]), "2024-01-01 00:00:00");
        let err = store.ensure_table(&orders_ref(), &rows).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_upsert_same_snapshot_is_idempotent() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        let rows = table(
            json!([{"id": 1, "total": "10.00"}, {"id": 2, "total": "20.00"}]),
            "2024-01-01 00:00:00",
        );

        load(&mut store, &target, &rows);
        load(&mut store, &target, &rows);

        assert_eq!(store.count_rows(&target).unwrap(), 2);
    }

    #[test]
    fn test_upsert_replaces_values_for_same_key() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();

        load(&mut store, &target, &table(json!([{"id": 1, "total": "10.00"}]), "2024-01-01 00:00:00"));
        load(&mut store, &target, &table(json!([{"id": 1, "total": "12.50"}]), "2024-01-01 00:00:00"));

        let total: String = store
            .connection()
            .query_row("SELECT total FROM entities.shopify_orders WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, "12.50");
        assert_eq!(store.count_rows(&target).unwrap(), 1);
    }

    #[test]
    fn test_upsert_new_snapshot_appends() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        let payload = json!([{"id": 1}, {"id": 2}]);

        load(&mut store, &target, &table(payload.clone(), "2024-01-01 00:00:00"));
        load(&mut store, &target, &table(payload, "2024-01-02 00:00:00"));

        assert_eq!(store.count_rows(&target).unwrap(), 4);
        let counts = store.snapshot_counts(&target, 10).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0], ("2024-01-02 00:00:00".to_string(), 2));
        assert_eq!(counts[1].1, 2);
    }

    #[test]
    fn test_upsert_drops_unknown_columns() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();

        load(&mut store, &target, &table(json!([{"id": 1, "a": "x"}]), "2024-01-01 00:00:00"));
        let report = load(
            &mut store,
            &target,
            &table(json!([{"id": 2, "b": "y"}]), "2024-01-01 00:00:00"),
        );

        assert_eq!(report.columns_dropped, vec!["b".to_string()]);
        assert_eq!(report.rows_written, 1);
        assert_eq!(store.count_rows(&target).unwrap(), 2);
    }

    #[test]
    fn test_upsert_missing_table() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let rows = table(json!([{"id": 1}]), "2024-01-01 00:00:00");
        let err = store.upsert(&orders_ref(), &rows).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Database(DatabaseError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_nested_values_stored_as_json_text() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        load(
            &mut store,
            &target,
            &table(json!([{"id": 1, "tags": ["a", "b"]}]), "2024-01-01 00:00:00"),
        );

        let tags: String = store
            .connection()
            .query_row("SELECT tags FROM entities.shopify_orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tags, r#"["a","b"]"#);
    }

    #[test]
    fn test_upsert_rejects_value_that_does_not_fit_stored_type() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        load(&mut store, &target, &table(json!([{"id": 1, "grams": 5}]), "2024-01-01 00:00:00"));

        let rows = table(json!([{"id": 1, "grams": 2.5}]), "2024-01-02 00:00:00");
        let err = store.upsert(&target, &rows).unwrap_err();

        match err {
            PipelineError::Validation(msg) => {
                assert!(msg.contains("'grams'"), "{msg}");
                assert!(msg.contains("BIGINT"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count_rows(&target).unwrap(), 1);
    }

    #[test]
    fn test_upsert_text_column_keeps_later_numbers_as_text() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = orders_ref();
        load(&mut store, &target, &table(json!([{"id": 1, "note": "n/a"}]), "2024-01-01 00:00:00"));
        load(&mut store, &target, &table(json!([{"id": 1, "note": 2.5}]), "2024-01-02 00:00:00"));

        let note: String = store
            .connection()
            .query_row(
                "SELECT note FROM entities.shopify_orders ORDER BY snapshot_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(note, "2.5");
    }

    #[test]
    fn test_write_header_only_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("out").join("line_items.csv");

        write_header_only_csv(&dest, &["id", "order_id", "snapshot_date"]).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "id,order_id,snapshot_date\n");
        assert!(!dir.path().join("out").join(".line_items.csv.tmp").exists());
    }

    #[test]
    fn test_export_csv_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("out").join("line_items.csv");
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = TableRef::new("entities", "shopify_order_line_items");

        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, "stale\ncontent\nthat\nis\nlonger\n").unwrap();

        load(
            &mut store,
            &target,
            &table(json!([{"id": 10, "sku": "A,1"}, {"id": 11, "sku": "B"}]), "2024-01-01 00:00:00"),
        );

        assert_eq!(store.export_csv(&target, &dest).unwrap(), 2);

        let contents = fs::read_to_string(&dest).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "id,sku,snapshot_date");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("\"A,1\""));
        assert!(!contents.contains("stale"));
    }

    #[test]
    fn test_export_csv_format_does_not_follow_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("line_items.parquet");
        let mut store = DuckDbStore::in_memory().unwrap();
        let target = TableRef::new("entities", "shopify_order_line_items");
        load(&mut store, &target, &table(json!([{"id": 10, "sku": "A"}]), "2024-01-01 00:00:00"));

        assert_eq!(store.export_csv(&target, &dest).unwrap(), 1);

        let contents = fs::read_to_string(&dest).unwrap();
        assert!(contents.starts_with("id,sku,snapshot_date\n10,A,2024-01-01"), "{contents}");
    }

    #[test]
    fn test_export_csv_missing_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = DuckDbStore::in_memory().unwrap();
        let err = store
            .export_csv(&orders_ref(), &dir.path().join("x.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Database(DatabaseError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_sql_string_literal() {
        assert_eq!(sql_string_literal("/tmp/it's.csv"), "'/tmp/it''s.csv'");
    }
}
