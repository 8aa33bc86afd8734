//! Cart entries as submitted by clients.

use serde::Deserialize;
use serde_json::Value;

use crate::error::OrderError;

/// One entry of a submitted cart.
///
/// `quantity` is kept as raw JSON because browser forms send it as either a
/// number or a string. `price` is accepted for compatibility with older
/// clients and never used: prices always come from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartEntry {
    pub name: String,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub price: Option<Value>,
}

impl CartEntry {
    /// Creates an entry with a numeric quantity.
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity: Value::from(quantity),
            price: None,
        }
    }
}

/// Parses a quantity that must be a positive whole number.
///
/// Accepts JSON integers and strings holding digits (surrounding whitespace
/// is ignored). Zero, negatives, fractions and anything else are rejected.
pub fn parse_quantity(item: &str, raw: &Value) -> Result<u32, OrderError> {
    let parsed = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|q| u32::try_from(q).ok()) {
        Some(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(OrderError::InvalidQuantity {
            item: item.to_string(),
            value: raw.to_string(),
        }),
    }
}
