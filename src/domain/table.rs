//! Tabular record sets
//!
//! [`FlatTable`] is the in-memory shape handed from the transform step to the
//! DuckDB store: ordered, typed columns and rows of JSON cells.

use super::snapshot::{SnapshotDate, SNAPSHOT_COLUMN};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Column holding the record identifier
pub const ID_COLUMN: &str = "id";

/// SQL column types produced by inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    BigInt,
    Double,
    Varchar,
    Timestamp,
}

impl ColumnType {
    /// DuckDB type name
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    /// Map a DuckDB `data_type` back onto an inferred type
    ///
    /// Integer and floating families collapse into `BigInt` and `Double`.
    /// Types inference never produces (lists, structs, ...) give `None`.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        match base {
            "BOOLEAN" | "BOOL" => Some(ColumnType::Boolean),
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" => Some(ColumnType::BigInt),
            "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" | "NUMERIC" => Some(ColumnType::Double),
            "VARCHAR" | "TEXT" | "STRING" | "JSON" => Some(ColumnType::Varchar),
            b if b.starts_with("TIMESTAMP") => Some(ColumnType::Timestamp),
            _ => None,
        }
    }

    /// Whether a JSON cell can be stored in a column of this type unchanged
    ///
    /// `Varchar` accepts anything (non-strings are stored as JSON text).
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Varchar, _) => true,
            (ColumnType::Boolean, Value::Bool(_)) => true,
            (ColumnType::BigInt, Value::Number(n)) => n.is_i64(),
            (ColumnType::Double, Value::Number(_)) => true,
            (ColumnType::Timestamp, Value::String(_)) => true,
            _ => false,
        }
    }

    /// Type of a single cell, `None` for null
    fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Number(n) if n.is_i64() => Some(ColumnType::BigInt),
            Value::Number(_) => Some(ColumnType::Double),
            _ => Some(ColumnType::Varchar),
        }
    }

    /// Widen two observed types into one that holds both
    fn merge(self, other: Self) -> Self {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (BigInt, Double) | (Double, BigInt) => Double,
            _ => Varchar,
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Fully qualified table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Quoted `"schema"."table"` for use in SQL text
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Ordered columns plus rows of cells
///
/// Every row has exactly one cell per column; records that lack a column get
/// `Value::Null` in that position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl FlatTable {
    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from records
    ///
    /// Columns appear in the order they are first seen across the records.
    /// Types are inferred from the non-null cells of each column.
    ///
    /// # Examples
    ///
    /// ```
    /// use orderflow::domain::{ColumnType, FlatTable};
    /// use serde_json::json;
    ///
    /// let records = vec![
    ///     json!({"id": 1, "sku": "A"}).as_object().unwrap().clone(),
    ///     json!({"id": 2, "price": 9.5}).as_object().unwrap().clone(),
    /// ];
    /// let table = FlatTable::from_records(records);
    /// assert_eq!(table.column_names(), vec!["id", "sku", "price"]);
    /// assert_eq!(table.columns()[0].column_type, ColumnType::BigInt);
    /// assert!(table.rows()[1][1].is_null());
    /// ```
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in &records {
            for key in record.keys() {
                if !positions.contains_key(key) {
                    positions.insert(key.clone(), names.len());
                    names.push(key.clone());
                }
            }
        }

        let mut types: Vec<Option<ColumnType>> = vec![None; names.len()];
        let mut rows = Vec::with_capacity(records.len());

        for mut record in records {
            let mut row = Vec::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                let value = record.remove(name).unwrap_or(Value::Null);
                if let Some(observed) = ColumnType::of_value(&value) {
                    types[idx] = Some(match types[idx] {
                        Some(current) => current.merge(observed),
                        None => observed,
                    });
                }
                row.push(value);
            }
            rows.push(row);
        }

        let columns = names
            .into_iter()
            .zip(types)
            .map(|(name, column_type)| Column {
                name,
                column_type: column_type.unwrap_or(ColumnType::Varchar),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Stamp every row with the snapshot as the last column
    ///
    /// An existing `snapshot_date` column is replaced.
    pub fn with_snapshot(mut self, snapshot: SnapshotDate) -> Self {
        if let Some(idx) = self.column_index(SNAPSHOT_COLUMN) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }

        let literal = Value::String(snapshot.to_sql_string());
        self.columns.push(Column {
            name: SNAPSHOT_COLUMN.to_string(),
            column_type: ColumnType::Timestamp,
        });
        for row in &mut self.rows {
            row.push(literal.clone());
        }
        self
    }

    /// Collapse rows sharing the same value in `key`, keeping the last one
    ///
    /// The surviving row takes the position of the first occurrence.
    /// Returns the number of rows dropped.
    pub fn dedup_by(&mut self, key: &str) -> usize {
        let Some(idx) = self.column_index(key) else {
            return 0;
        };

        let before = self.rows.len();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<Vec<Value>> = Vec::with_capacity(before);

        for row in self.rows.drain(..) {
            let k = row[idx].to_string();
            match seen.get(&k) {
                Some(&pos) => kept[pos] = row,
                None => {
                    seen.insert(k, kept.len());
                    kept.push(row);
                }
            }
        }

        self.rows = kept;
        before - self.rows.len()
    }
}
