//! # Structured Payloads
//!
//! Raw source payloads are arbitrary JSON trees. This module provides the
//! small set of lookups aggregation needs over them: a depth-bounded search
//! for itemised asset lists and typed field readers that tolerate numbers
//! encoded as strings.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// A JSON object inside a payload.
pub type PayloadMap = Map<String, Value>;

/// Maximum nesting depth visited while searching for an item list.
pub const MAX_SEARCH_DEPTH: usize = 16;

/// Error raised when a payload field holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// A field expected to be numeric could not be parsed.
    #[error("field '{field}' is not a number: {value}")]
    NotANumber {
        /// Field name.
        field: String,
        /// Offending raw value.
        value: String,
    },
}

/// Finds the itemised asset list under the first key that yields one.
///
/// Keys are tried in order. For each key the tree is searched depth-first
/// (maps, and maps nested in lists) and the search stops at the first
/// non-empty list of objects. Non-object list elements are ignored.
///
/// # Examples
///
/// ```
/// use asset_aggregator::domain::value_objects::payload::extract_items;
/// use serde_json::json;
///
/// let payload = json!({"data": {"accounts": [{"accountId": "A1"}, 7]}});
/// let items = extract_items(&payload, &["bankAssets", "accounts"]);
/// assert_eq!(items.len(), 1);
/// ```
#[must_use]
pub fn extract_items(payload: &Value, keys: &[&str]) -> Vec<PayloadMap> {
    let Value::Object(root) = payload else {
        return Vec::new();
    };
    for key in keys {
        if let Some(found) = search(root, key, 0) {
            return found;
        }
    }
    Vec::new()
}

fn search(current: &PayloadMap, key: &str, depth: usize) -> Option<Vec<PayloadMap>> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    if let Some(items) = current.get(key).and_then(object_list) {
        return Some(items);
    }
    for value in current.values() {
        let found = match value {
            Value::Object(nested) => search(nested, key, depth + 1),
            Value::Array(elements) => elements.iter().find_map(|element| match element {
                Value::Object(nested) => search(nested, key, depth + 1),
                _ => None,
            }),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn object_list(value: &Value) -> Option<Vec<PayloadMap>> {
    let Value::Array(elements) = value else {
        return None;
    };
    let items: Vec<PayloadMap> = elements
        .iter()
        .filter_map(|element| element.as_object().cloned())
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

/// Reads a trimmed, non-blank string field. Numbers and booleans are
/// rendered with their JSON text.
#[must_use]
pub fn string_field(item: &PayloadMap, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads the first non-blank string among `fields`.
#[must_use]
pub fn string_field_any(item: &PayloadMap, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| string_field(item, field))
}

/// Reads a decimal field given as a JSON number or a numeric string.
///
/// Absent, null, blank and non-scalar values read as `None`.
///
/// # Errors
///
/// Returns `PayloadError::NotANumber` when the value is present but not
/// parseable.
pub fn decimal_field(item: &PayloadMap, field: &str) -> Result<Option<Decimal>, PayloadError> {
    let raw = match item.get(field) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Ok(None),
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map(Some)
        .map_err(|_| PayloadError::NotANumber {
            field: field.to_string(),
            value: raw,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn expected_key_wins_over_fallback() {
        let payload = json!({
            "accounts": [{"accountId": "fallback"}],
            "bankAssets": [{"accountId": "primary"}],
        });
        let items = extract_items(&payload, &["bankAssets", "accounts"]);
        assert_eq!(items.len(), 1);
        assert_eq!(string_field(&items[0], "accountId").unwrap(), "primary");
    }

    #[test]
    fn falls_back_to_alternate_key() {
        let payload = json!({"accounts": [{"accountId": "A1"}, {"accountId": "A2"}]});
        let items = extract_items(&payload, &["bankAssets", "accounts"]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn finds_nested_lists_inside_arrays() {
        let payload = json!({
            "pages": [
                {"meta": 1},
                {"body": {"holdings": [{"symbol": "2330"}]}}
            ]
        });
        let items = extract_items(&payload, &["securitiesAssets", "holdings"]);
        assert_eq!(string_field(&items[0], "symbol").unwrap(), "2330");
    }

    #[test]
    fn scalar_lists_and_missing_keys_yield_empty() {
        assert!(extract_items(&json!({"bankAssets": [1, 2]}), &["bankAssets"]).is_empty());
        assert!(extract_items(&json!({"other": []}), &["bankAssets"]).is_empty());
        assert!(extract_items(&json!([{"bankAssets": []}]), &["bankAssets"]).is_empty());
    }

    #[test]
    fn search_depth_is_bounded() {
        let mut payload = json!({"policies": [{"policyNumber": "P1"}]});
        for _ in 0..(MAX_SEARCH_DEPTH + 2) {
            payload = json!({ "wrap": payload });
        }
        assert!(extract_items(&payload, &["policies"]).is_empty());
    }

    #[test]
    fn decimal_field_accepts_numbers_and_strings() {
        let item = json!({"a": 10.5, "b": " 42 ", "c": "", "d": null, "e": "abc"});
        let item = item.as_object().unwrap();
        assert_eq!(decimal_field(item, "a").unwrap(), Some(dec!(10.5)));
        assert_eq!(decimal_field(item, "b").unwrap(), Some(dec!(42)));
        assert_eq!(decimal_field(item, "c").unwrap(), None);
        assert_eq!(decimal_field(item, "d").unwrap(), None);
        assert_eq!(decimal_field(item, "missing").unwrap(), None);
        assert!(decimal_field(item, "e").is_err());
    }

    #[test]
    fn string_field_any_picks_first_present() {
        let item = json!({"assetType": "fund", "securityType": "  "});
        let item = item.as_object().unwrap();
        assert_eq!(
            string_field_any(item, &["securityType", "assetType"]).unwrap(),
            "fund"
        );
    }
}
