//! Forgiving deserializers for the record tree
//!
//! A damaged record should not cost the user the rest of the file. These
//! helpers decode through `serde_json::Value` so a failure is contained to the
//! record it belongs to, which then falls back to its default construction.
//! A `null` member decodes like a missing one: the field takes its default and
//! the rest of the record is kept.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::ids::{EntryId, Identified};

/// Keyed collection: `{ "<id>": { ... }, ... }`
///
/// A value that fails to decode becomes `T::default()` carrying the key as id.
/// Non-object values are dropped. Records without an id take their key.
pub fn keyed<'de, D, T>(deserializer: D) -> Result<IndexMap<EntryId, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Identified + DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    let map = match raw {
        Value::Object(map) => map,
        Value::Null => return Ok(IndexMap::new()),
        other => {
            warn!(found = %kind_of(&other), "Expected an object for keyed collection, using empty collection");
            return Ok(IndexMap::new());
        }
    };

    let mut entries = IndexMap::with_capacity(map.len());
    for (key, mut value) in map {
        if !value.is_object() {
            warn!(key = %key, found = %kind_of(&value), "Skipping non-object collection entry");
            continue;
        }

        strip_nulls(&mut value);
        let mut record = match serde_json::from_value::<T>(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to decode record, using default");
                T::default()
            }
        };
        // The key is authoritative
        if record.id().as_str() != key {
            if !record.id().is_empty() {
                warn!(key = %key, id = %record.id(), "Record id differs from its key, using the key");
            }
            record.set_id(EntryId::from(key.as_str()));
        }
        entries.insert(EntryId::from(key), record);
    }
    Ok(entries)
}

/// Ordered list of identified records: `[ { ... }, ... ]`
///
/// Elements that fail to decode become the default element with a fresh id.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Identified + DeserializeOwned + Default,
{
    let items = array_items(Value::deserialize(deserializer)?, "record list");
    let mut out = Vec::with_capacity(items.len());
    for mut value in items {
        if !value.is_object() {
            warn!(found = %kind_of(&value), "Skipping non-object list element");
            continue;
        }
        strip_nulls(&mut value);
        let mut record = serde_json::from_value::<T>(value).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to decode list element, using default");
            T::default()
        });
        if record.id().is_empty() {
            record.set_id(T::fresh_id());
        }
        out.push(record);
    }
    Ok(out)
}

/// Ordered list of plain values without ids (sensitive elements, tags, names).
/// Elements that do not decode are dropped.
pub fn values<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = array_items(Value::deserialize(deserializer)?, "value list");
    Ok(items
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value::<T>(value.clone())
                .inspect_err(|e| warn!(value = %value, error = %e, "Dropping undecodable list value"))
                .ok()
        })
        .collect())
}

/// Singular nested structure: null or undecodable input becomes `T::default()`
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let mut raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    strip_nulls(&mut raw);
    Ok(serde_json::from_value::<T>(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to decode nested structure, using default");
        T::default()
    }))
}

/// Remove `null` object members at every depth
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn array_items(raw: Value, what: &str) -> Vec<Value> {
    match raw {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!(found = %kind_of(&other), what, "Expected an array, using empty list");
            Vec::new()
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
