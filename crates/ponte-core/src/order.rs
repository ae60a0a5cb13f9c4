//! Tolerant extraction of order fields from webhook payloads.
//!
//! The ordering platform delivers orders in several near-identical shapes
//! depending on which integration produced them. Nothing about the payload
//! is guaranteed, so every field resolves through an explicit, ordered list
//! of accessor paths and falls back to a defined default. Each resolver is
//! a small pure function over `serde_json::Value`; `OrderSummary` is the
//! strongly-typed result the rest of the pipeline works with.

use serde_json::Value;

/// Placeholder used when no order identifier is present anywhere.
pub const UNKNOWN_ORDER_ID: &str = "unknown";

/// Customer name used when the payload carries none.
pub const DEFAULT_CUSTOMER_NAME: &str = "Cliente Online";

/// Accessor paths for the order identifier, in priority order.
const ORDER_ID_PATHS: &[&[&str]] = &[
    &["order_id"],
    &["orderId"],
    &["id"],
    &["order", "id"],
    &["order", "order_id"],
];

/// Accessor paths for the customer name, in priority order.
const CUSTOMER_NAME_PATHS: &[&[&str]] =
    &[&["customer", "name"], &["customer_name"], &["customerName"]];

/// Accessor paths for the customer email, in priority order.
const CUSTOMER_EMAIL_PATHS: &[&[&str]] =
    &[&["customer", "email"], &["customer_email"], &["customerEmail"]];

/// Accessor paths for the line-item collection, in priority order.
const ITEMS_PATHS: &[&[&str]] =
    &[&["items"], &["order", "items"], &["cart", "items"], &["products"]];

const QUANTITY_PATHS: &[&[&str]] = &[&["quantity"], &["qty"]];
const PRICE_PATHS: &[&[&str]] = &[&["price"], &["unit_price"], &["unitPrice"]];
const REFERENCE_PATHS: &[&[&str]] = &[&["id"], &["product_id"], &["productId"], &["sku"]];
const DESCRIPTION_PATHS: &[&[&str]] = &[&["name"], &["title"]];

/// An order reduced to the fields the invoicing side needs.
///
/// Produced by [`OrderSummary::from_payload`], which is total: any JSON
/// value, including `null`, yields a summary with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    /// Order identifier, or [`UNKNOWN_ORDER_ID`] when absent.
    pub id: String,
    /// Customer display name, or [`DEFAULT_CUSTOMER_NAME`] when absent.
    pub customer_name: String,
    /// Customer email; empty string when absent.
    pub customer_email: String,
    /// Resolved line items; empty when the payload carries none.
    pub lines: Vec<OrderLine>,
}

/// A single resolved line item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Product reference code, or the 1-based position when no identifier
    /// field is present.
    pub reference: String,
    /// Quantity; defaults to 1 when absent, non-numeric, or zero.
    pub quantity: f64,
    /// Unit price; defaults to 0 when absent or non-numeric.
    pub price: f64,
    /// Optional display name for the line.
    pub description: Option<String>,
}

impl OrderSummary {
    /// Extracts an order summary from any webhook payload.
    ///
    /// Never fails: a malformed or absent body arrives here as
    /// `Value::Null` and produces the all-defaults summary.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            id: resolve_order_id(payload),
            customer_name: resolve_customer_name(payload),
            customer_email: resolve_customer_email(payload),
            lines: resolve_items(payload)
                .iter()
                .enumerate()
                .map(|(idx, item)| resolve_line(item, idx))
                .collect(),
        }
    }

    /// Whether the payload carried an explicit order identifier.
    pub fn has_known_id(&self) -> bool {
        self.id != UNKNOWN_ORDER_ID
    }
}

/// Resolves the order identifier, coercing numeric ids to their decimal
/// string.
pub fn resolve_order_id(payload: &Value) -> String {
    first_present(payload, ORDER_ID_PATHS)
        .and_then(as_reference)
        .unwrap_or_else(|| UNKNOWN_ORDER_ID.to_string())
}

/// Resolves the customer display name.
pub fn resolve_customer_name(payload: &Value) -> String {
    first_string(payload, CUSTOMER_NAME_PATHS)
        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string())
}

/// Resolves the customer email; empty string when the payload has none.
pub fn resolve_customer_email(payload: &Value) -> String {
    first_string(payload, CUSTOMER_EMAIL_PATHS).unwrap_or_default()
}

/// Resolves the line-item collection.
///
/// The first present container wins; a container that is not a JSON array
/// resolves to the empty list.
pub fn resolve_items(payload: &Value) -> Vec<Value> {
    first_present(payload, ITEMS_PATHS)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Resolves a single line item at 0-based index `idx`.
pub fn resolve_line(item: &Value, idx: usize) -> OrderLine {
    let quantity = first_present(item, QUANTITY_PATHS)
        .and_then(as_number)
        .filter(|q| *q != 0.0)
        .unwrap_or(1.0);

    let price = first_present(item, PRICE_PATHS).and_then(as_number).unwrap_or(0.0);

    let reference = first_present(item, REFERENCE_PATHS)
        .and_then(as_reference)
        .unwrap_or_else(|| (idx + 1).to_string());

    let description = first_string(item, DESCRIPTION_PATHS);

    OrderLine { reference, quantity, price, description }
}

/// Returns the first present value among the given accessor paths.
///
/// `null` and the empty string count as absent, so a payload that spells a
/// field out as empty still falls through to the next candidate.
fn first_present<'a>(payload: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(payload, path))
}

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = payload;
    for key in path {
        current = current.get(key)?;
    }
    match current {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        _ => Some(current),
    }
}

fn first_string(payload: &Value, paths: &[&[&str]]) -> Option<String> {
    first_present(payload, paths).and_then(Value::as_str).map(str::to_string)
}

/// Coerces a JSON value to a number the way the wire formats demand:
/// numbers pass through, numeric strings parse, everything else is absent.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerces a JSON value to a reference string. Numeric identifiers become
/// their decimal representation.
fn as_reference(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
