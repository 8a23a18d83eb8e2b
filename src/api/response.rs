//! Response envelope decoding.
//!
//! Every operation answers `{"data": {<root>: {<field>: ...}}}`. The node at
//! that path is either the requested object or a `MutationError` carrying an
//! `errors` array, so both arms are checked before the payload is handed on.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, MutationErrorEntry};

/// Deserializes a string, number or null into a `String`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Deserializes a non-negative integer given as a number, numeric string or null.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    value_as_u64(&value)
        .ok_or_else(|| de::Error::custom(format!("expected non-negative integer, got {value}")))
}

/// Reads a `u64` from a JSON number or a numeric string.
pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Pagination metadata attached to every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Current 1-based page.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: u64,
    /// Whether a later page exists.
    #[serde(default)]
    pub has_next_page: bool,
    /// Whether an earlier page exists.
    #[serde(default)]
    pub has_previous_page: bool,
    /// Item count across every page.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_items: u64,
    /// Number of pages.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_pages: u64,
    /// Page size.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub items_per_page: u64,
    /// Canonical site URL of this listing.
    #[serde(default)]
    pub url_complete: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage<T> {
    /// Pagination metadata.
    pub info: PageInfo,
    /// The items on this page, in listing order.
    pub items: Vec<T>,
}

impl<T> SearchPage<T> {
    /// Converts every item, dropping those `f` rejects; page metadata is kept.
    pub fn filter_map<U>(self, f: impl FnMut(T) -> Option<U>) -> SearchPage<U> {
        SearchPage {
            info: self.info,
            items: self.items.into_iter().filter_map(f).collect(),
        }
    }
}

/// Takes the node at `data.<path...>` out of a response body.
///
/// # Errors
///
/// - [`ApiError::Mutation`] when the node (or the top level, lacking data)
///   carries an `errors` array
/// - [`ApiError::MalformedResponse`] when any path segment is missing or null
pub fn extract(mut body: Value, operation: &'static str, path: &[&str]) -> Result<Value, ApiError> {
    let data = match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => data,
        _ => {
            if let Some(errors) = mutation_errors(&body) {
                return Err(ApiError::Mutation { operation, errors });
            }
            return Err(ApiError::malformed(operation, "response has no data"));
        }
    };

    let mut node = data;
    for (depth, segment) in path.iter().enumerate() {
        node = match node.get_mut(*segment).map(Value::take) {
            Some(next) if !next.is_null() => next,
            _ => {
                let walked = path[..=depth].join(".");
                return Err(ApiError::malformed(operation, format!("missing data.{walked}")));
            }
        };
    }

    if let Some(errors) = mutation_errors(&node) {
        return Err(ApiError::Mutation { operation, errors });
    }
    Ok(node)
}

/// Splits a `{info, items}` listing node into metadata and raw items.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if `info` does not decode or
/// `items` is not an array.
pub fn split_listing(
    mut node: Value,
    operation: &'static str,
) -> Result<SearchPage<Value>, ApiError> {
    let info = node.get_mut("info").map(Value::take).unwrap_or(Value::Null);
    let info: PageInfo = serde_json::from_value(info)
        .map_err(|e| ApiError::malformed(operation, format!("bad page info: {e}")))?;
    let items = match node.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(ApiError::malformed(
                operation,
                format!("items is not an array: {other}"),
            ));
        }
    };
    Ok(SearchPage { info, items })
}

fn mutation_errors(node: &Value) -> Option<Vec<MutationErrorEntry>> {
    let errors = node.get("errors")?.as_array()?;
    Some(
        errors
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.clone()).unwrap_or_else(|_| MutationErrorEntry {
                    code: String::new(),
                    message: entry.to_string(),
                })
            })
            .collect(),
    )
}
