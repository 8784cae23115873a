//! Typed extraction from snake_case JSON write payloads.
//!
//! Presence carries meaning in these payloads: an absent key is "leave the
//! column alone", an explicit `null` is "set the column NULL". The helpers
//! here keep that distinction while rejecting values of the wrong type.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

pub(super) fn required_i32(row: &Map<String, Value>, key: &str) -> Result<i32> {
    let value = row
        .get(key)
        .with_context(|| format!("missing required field {key}"))?;
    let number = value
        .as_i64()
        .with_context(|| format!("{key} must be an integer"))?;
    i32::try_from(number).with_context(|| format!("{key} out of range"))
}

pub(super) fn required_string(row: &Map<String, Value>, key: &str) -> Result<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .with_context(|| format!("missing required field {key}"))
}

pub(super) fn opt_string(value: &Value, key: &str) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => anyhow::bail!("{key} must be a string or null"),
    }
}

pub(super) fn opt_i32(value: &Value, key: &str) -> Result<Option<i32>> {
    match value {
        Value::Null => Ok(None),
        other => {
            let number = other
                .as_i64()
                .with_context(|| format!("{key} must be an integer or null"))?;
            Ok(Some(
                i32::try_from(number).with_context(|| format!("{key} out of range"))?,
            ))
        }
    }
}

pub(super) fn opt_bool(value: &Value, key: &str) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        _ => anyhow::bail!("{key} must be a boolean or null"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_and_absent_are_distinct() {
        let row: Map<String, Value> = serde_json::from_value(json!({ "notes": null })).unwrap();
        assert_eq!(opt_string(&row["notes"], "notes").unwrap(), None);
        assert!(row.get("rating").is_none());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(opt_i32(&json!("seven"), "rating").is_err());
        assert!(opt_bool(&json!(1), "is_favorite").is_err());
        assert!(opt_string(&json!(42), "notes").is_err());
    }

    #[test]
    fn required_fields_surface_missing_keys() {
        let row = Map::new();
        let err = required_i32(&row, "tmdb_id").unwrap_err();
        assert!(err.to_string().contains("tmdb_id"));
    }
}
