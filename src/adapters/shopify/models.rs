//! Shopify Admin API models
//!
//! Response shapes for the two endpoints the pipeline calls. Orders stay
//! untyped (see [`crate::domain::Order`]); only the shop identity is typed.

use crate::domain::{Order, Result, ShopifyError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /shop.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ShopResponse {
    pub shop: ShopIdentity,
}

/// Identity of the store behind the access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopIdentity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
}

/// Parse the body of `GET /orders.json`
///
/// A missing or null `orders` field yields an empty list. Any other
/// non-array value, or an array entry that is not an object, is an invalid
/// response.
pub fn parse_orders_body(body: &str) -> Result<Vec<Order>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ShopifyError::InvalidResponse(format!("orders body is not valid JSON: {e}"))
    })?;

    let Value::Object(mut root) = value else {
        return Err(
            ShopifyError::InvalidResponse("orders body is not a JSON object".to_string()).into(),
        );
    };

    match root.remove("orders") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| -> Result<Order> {
                match item {
                    Value::Object(order) => Ok(order),
                    other => Err(ShopifyError::InvalidResponse(format!(
                        "orders[{idx}] is not an object: {other}"
                    ))
                    .into()),
                }
            })
            .collect(),
        Some(other) => Err(ShopifyError::InvalidResponse(format!(
            "'orders' is not an array: {other}"
        ))
        .into()),
    }
}

/// Extract the `rel="next"` target from a `Link` response header
///
/// Shopify paginates with cursor links of the form
/// `<https://...?page_info=abc>; rel="next", <...>; rel="previous"`.
pub fn next_page_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
