//! `--set field=value` assignments applied to a record's JSON form
//!
//! Values are coerced to the JSON type the field already has: numbers, booleans,
//! comma-separated string lists and plain strings. Identifier fields and lists
//! of nested records have their own commands and cannot be set here.
//! List items the record type does not accept are an error, never dropped.

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Assigned by the application, never by hand
const ID_FIELDS: &[&str] = &["entry_id", "conflict_id", "stage_id", "facility_id", "campaign_id"];

/// Edited through `stage`, `facility` and `limit`
const NESTED_FIELDS: &[&str] = &["stages", "special_facilities", "sensitive_elements"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("missing field name in '{s}'"));
        }
        Ok(Self {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Copy of `record` with every assignment applied
pub fn apply<T: Serialize + DeserializeOwned>(record: &T, assignments: &[Assignment]) -> Result<T> {
    let mut value = serde_json::to_value(record).context("Failed to serialize record")?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| anyhow!("record does not serialize to a JSON object"))?;

    for assignment in assignments {
        assign(fields, assignment)?;
    }

    let record: T = serde_json::from_value(value.clone()).context("Field values do not fit the record")?;
    let stored = serde_json::to_value(&record).context("Failed to serialize record")?;
    for Assignment { field, .. } in assignments {
        if let (Value::Array(wanted), Value::Array(kept)) = (&value[field], &stored[field]) {
            let rejected: Vec<&str> = wanted
                .iter()
                .filter(|item| !kept.contains(item))
                .filter_map(Value::as_str)
                .collect();
            if !rejected.is_empty() {
                bail!("invalid value for '{field}': {}", rejected.join(", "));
            }
        }
    }
    Ok(record)
}

fn assign(fields: &mut Map<String, Value>, assignment: &Assignment) -> Result<()> {
    let Assignment { field, value } = assignment;
    if ID_FIELDS.contains(&field.as_str()) {
        bail!("'{field}' is assigned automatically and cannot be set");
    }
    if NESTED_FIELDS.contains(&field.as_str()) {
        bail!("'{field}' holds nested records; use its dedicated command");
    }
    let Some(current) = fields.get_mut(field) else {
        let known: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| !ID_FIELDS.contains(key) && !NESTED_FIELDS.contains(key))
            .collect();
        bail!("unknown field '{field}' (expected one of: {})", known.join(", "));
    };

    *current = coerce(current, value).with_context(|| format!("Invalid value for '{field}'"))?;
    Ok(())
}

fn coerce(current: &Value, raw: &str) -> Result<Value> {
    let raw_trimmed = raw.trim();
    let coerced = match current {
        Value::Number(number) if number.is_u64() => Value::from(raw_trimmed.parse::<u64>()?),
        Value::Number(number) if number.is_i64() => Value::from(raw_trimmed.parse::<i64>()?),
        Value::Number(_) => Value::from(raw_trimmed.parse::<f64>()?),
        Value::Bool(_) => Value::Bool(parse_bool(raw_trimmed)?),
        Value::Array(_) => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        Value::Object(_) => bail!("structured field cannot be set from text"),
        Value::String(_) | Value::Null => Value::String(raw.to_string()),
    };
    Ok(coerced)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => bail!("expected true or false, got '{raw}'"),
    }
}
