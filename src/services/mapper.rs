//! Field-name translation between the wire shape of list items (camelCase)
//! and their storage shape (snake_case columns).
//!
//! The translation is deliberately shallow: only the keys in [`FIELD_PAIRS`]
//! are renamed, every other key passes through untouched in both directions,
//! and values are never inspected. Because presence is meaningful for partial
//! writes, the mapper copies keys exactly as given: absent stays absent,
//! explicit `null` stays `null`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Wire key on the left, storage column on the right.
const FIELD_PAIRS: &[(&str, &str)] = &[
    ("tmdbId", "tmdb_id"),
    ("posterPath", "poster_path"),
    ("releaseYear", "release_year"),
    ("watchedAt", "watched_at"),
    ("addedAt", "added_at"),
    ("isFavorite", "is_favorite"),
    ("watchingStatus", "watching_status"),
    ("watchedProgressSeconds", "watched_progress_seconds"),
    ("originCountry", "origin_country"),
];

fn wire_to_row_key(key: &str) -> &str {
    FIELD_PAIRS
        .iter()
        .find(|(wire, _)| *wire == key)
        .map_or(key, |(_, row)| row)
}

fn row_to_wire_key(key: &str) -> &str {
    FIELD_PAIRS
        .iter()
        .find(|(_, row)| *row == key)
        .map_or(key, |(wire, _)| wire)
}

/// Converts a wire item into a storage row.
///
/// ```rust
/// use serde_json::json;
/// use watcharr::services::mapper;
///
/// let item = json!({ "tmdbId": 603, "title": "The Matrix", "isFavorite": true });
/// let row = mapper::to_row(item.as_object().unwrap());
/// assert_eq!(row["tmdb_id"], json!(603));
/// assert_eq!(row["title"], json!("The Matrix"));
/// assert_eq!(row["is_favorite"], json!(true));
/// ```
#[must_use]
pub fn to_row(item: &Map<String, Value>) -> Map<String, Value> {
    item.iter()
        .map(|(key, value)| (wire_to_row_key(key).to_string(), value.clone()))
        .collect()
}

/// Converts a storage row back into a wire item.
///
/// ```rust
/// use serde_json::json;
/// use watcharr::services::mapper;
///
/// let row = json!({ "tmdb_id": 603, "watching_status": null, "user_id": "admin" });
/// let item = mapper::to_item(row.as_object().unwrap());
/// assert_eq!(item["tmdbId"], json!(603));
/// assert_eq!(item["watchingStatus"], json!(null));
/// assert_eq!(item["user_id"], json!("admin"));
/// ```
#[must_use]
pub fn to_item(row: &Map<String, Value>) -> Map<String, Value> {
    row.iter()
        .map(|(key, value)| (row_to_wire_key(key).to_string(), value.clone()))
        .collect()
}

/// Serializes a stored model and renames its columns to wire keys.
pub fn model_to_item<T: Serialize>(model: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(to_item(&map)),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn renames_known_keys_in_both_directions() {
        let item = as_map(json!({
            "tmdbId": 42,
            "posterPath": "/p.jpg",
            "releaseYear": "1999",
            "watchedAt": "2026-01-01T00:00:00Z",
            "isFavorite": false,
            "watchingStatus": "watching",
            "watchedProgressSeconds": 125,
            "originCountry": "TR,US",
        }));

        let row = to_row(&item);
        assert_eq!(row["tmdb_id"], json!(42));
        assert_eq!(row["poster_path"], json!("/p.jpg"));
        assert_eq!(row["watched_progress_seconds"], json!(125));

        let back = to_item(&row);
        assert_eq!(back, item);
    }

    #[test]
    fn unknown_keys_pass_through_unchanged() {
        let row = as_map(json!({
            "id": 7,
            "user_id": "admin",
            "created_at": "2026-01-01T00:00:00Z",
            "title": "Dune",
            "type": "movie",
        }));

        let item = to_item(&row);
        assert_eq!(item["id"], json!(7));
        assert_eq!(item["user_id"], json!("admin"));
        assert_eq!(item["created_at"], json!("2026-01-01T00:00:00Z"));
        assert_eq!(item["title"], json!("Dune"));
    }

    #[test]
    fn null_survives_translation() {
        let item = as_map(json!({ "watchingStatus": null }));
        let row = to_row(&item);
        assert_eq!(row["watching_status"], Value::Null);
        assert!(!row.contains_key("watchingStatus"));
    }

    #[test]
    fn absent_keys_stay_absent() {
        let item = as_map(json!({ "tmdbId": 1, "title": "X" }));
        let row = to_row(&item);
        assert!(!row.contains_key("rating"));
        assert!(!row.contains_key("watching_status"));
    }
}
