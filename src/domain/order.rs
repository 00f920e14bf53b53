//! Order records as returned by the Shopify Admin API
//!
//! Orders are semi-structured at the source, so they are kept as JSON maps
//! (key order preserved) rather than typed structs.

use serde_json::{Map, Value};

/// One order object from the `orders` array
pub type Order = Map<String, Value>;

/// One entry of an order's `line_items` array
pub type LineItem = Map<String, Value>;

/// Key of the nested line items collection on an order
pub const LINE_ITEMS_FIELD: &str = "line_items";

/// The order's `id`, if present
pub fn order_id(order: &Order) -> Option<&Value> {
    order.get("id").filter(|v| !v.is_null())
}

/// Line items of an order
///
/// Entries that are not JSON objects are ignored; a missing or non-array
/// `line_items` field yields no items.
pub fn line_items(order: &Order) -> impl Iterator<Item = &LineItem> {
    order
        .get(LINE_ITEMS_FIELD)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_line_items_of_order() {
        let order = json!({"id": 1, "line_items": [{"id": 10}, "junk", {"id": 11}]});
        let order = order.as_object().unwrap();
        let ids: Vec<_> = line_items(order).map(|li| li["id"].clone()).collect();
        assert_eq!(ids, vec![json!(10), json!(11)]);
    }

    #[test]
    fn test_line_items_missing_field() {
        let order = json!({"id": 1});
        assert_eq!(line_items(order.as_object().unwrap()).count(), 0);
    }

    #[test]
    fn test_order_id_null_is_none() {
        let order = json!({"id": null});
        assert!(order_id(order.as_object().unwrap()).is_none());
    }
}
