//! Flattening of orders and line items into tables
//!
//! Orders keep their top-level keys as columns. Line items are normalized:
//! nested objects become dotted column names, so
//! `{"price_set": {"shop_money": {"amount": "1.00"}}}` turns into a
//! `price_set.shop_money.amount` column.

use crate::config::LineItemScope;
use crate::domain::order::{line_items, order_id};
use crate::domain::{FlatTable, Order, PipelineError, Result, SnapshotDate, ID_COLUMN};
use serde_json::{Map, Value};

/// Column carrying the parent order id on every line item row
pub const ORDER_ID_COLUMN: &str = "order_id";

const SEPARATOR: char = '.';

/// One row per order, stamped with `snapshot`
///
/// Nested objects and arrays are kept as their JSON text.
pub fn orders_table(orders: &[Order], snapshot: SnapshotDate) -> Result<FlatTable> {
    let records = orders
        .iter()
        .map(|order| {
            order
                .iter()
                .map(|(key, value)| (key.clone(), scalar_or_json(value)))
                .collect::<Map<String, Value>>()
        })
        .collect::<Vec<_>>();

    require_ids("order", &records)?;
    Ok(FlatTable::from_records(records).with_snapshot(snapshot))
}

/// One row per line item, stamped with `snapshot`
///
/// `scope` picks whether every order contributes its line items or only the
/// first one does. No orders means an empty table.
///
/// # Examples
///
/// ```
/// use orderflow::config::LineItemScope;
/// use orderflow::core::transform::line_items_table;
/// use orderflow::domain::SnapshotDate;
/// use serde_json::json;
///
/// let orders = vec![
///     json!({"id": 1, "line_items": [{"id": 10, "sku": "A"}]}).as_object().unwrap().clone(),
///     json!({"id": 2, "line_items": [{"id": 20, "sku": "B"}]}).as_object().unwrap().clone(),
/// ];
///
/// let table = line_items_table(&orders, LineItemScope::AllOrders, SnapshotDate::now()).unwrap();
/// assert_eq!(table.len(), 2);
///
/// let table = line_items_table(&orders, LineItemScope::FirstOrder, SnapshotDate::now()).unwrap();
/// assert_eq!(table.len(), 1);
/// ```
pub fn line_items_table(
    orders: &[Order],
    scope: LineItemScope,
    snapshot: SnapshotDate,
) -> Result<FlatTable> {
    let selected: &[Order] = match scope {
        LineItemScope::AllOrders => orders,
        LineItemScope::FirstOrder => &orders[..orders.len().min(1)],
    };

    let mut records = Vec::new();
    for order in selected {
        let parent = order_id(order).cloned();
        for item in line_items(order) {
            let mut record = normalize_record(item);
            if let Some(parent) = &parent {
                if !record.contains_key(ORDER_ID_COLUMN) {
                    record.insert(ORDER_ID_COLUMN.to_string(), parent.clone());
                }
            }
            records.push(record);
        }
    }

    require_ids("line item", &records)?;
    Ok(FlatTable::from_records(records).with_snapshot(snapshot))
}

/// Normalize nested objects into dotted keys
///
/// Arrays are not expanded; they are stored as JSON text. An empty nested
/// object produces no columns.
pub fn normalize_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in record {
        flatten_into(&mut out, key.clone(), value);
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(out, format!("{prefix}{SEPARATOR}{key}"), nested);
            }
        }
        other => {
            out.insert(prefix, scalar_or_json(other));
        }
    }
}

fn scalar_or_json(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        scalar => scalar.clone(),
    }
}

fn require_ids(kind: &str, records: &[Map<String, Value>]) -> Result<()> {
    match records
        .iter()
        .position(|r| r.get(ID_COLUMN).map_or(true, Value::is_null))
    {
        Some(idx) => Err(PipelineError::Validation(format!(
            "{kind} #{idx} has no '{ID_COLUMN}' and cannot be keyed"
        ))),
        None => Ok(()),
    }
}
