//! Tolerant field decoders for request payloads
//!
//! Interaction data arrives from many producers. A field that is present but
//! null or of the wrong type decodes to the same value as a missing field, and
//! a malformed list entry is skipped instead of failing the whole request.

use crate::types::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Decode `T`, falling back to `T::default()` when the value does not fit
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Numeric value, if the field holds a JSON number
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Non-negative count; fractional values round to the nearest whole count
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    // `as` saturates: negatives become 0 and huge values u32::MAX
    Ok(number(deserializer)?.map_or(0, |n| n.round() as u32))
}

/// Timestamp in any format [`parse_timestamp`] accepts; the epoch otherwise
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_timestamp(&raw),
        _ => None,
    };
    Ok(parsed.unwrap_or_default())
}

/// Decode a list, skipping entries that do not decode as `T`
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(values) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let total = values.len();
    let items: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if items.len() < total {
        warn!(skipped = total - items.len(), "skipping malformed list entries");
    }
    Ok(items)
}

/// Decode a string-keyed map, skipping entries that do not decode as `T`
pub(crate) fn entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(values) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    let total = values.len();
    let items: BTreeMap<String, T> = values
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect();
    if items.len() < total {
        warn!(skipped = total - items.len(), "skipping malformed map entries");
    }
    Ok(items)
}
