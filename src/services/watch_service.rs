use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::db::{WatchedItem, WatchlistItem};
use crate::domain::MediaType;

/// Errors from watched-list and watchlist operations.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("watched item {0} not found")]
    NotFound(i32),

    #[error("invalid item payload: {0}")]
    InvalidItem(String),

    #[error("title is already in the watched list")]
    AlreadyWatched,

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A user's watched log and watchlist, loaded once and queried in memory.
///
/// Membership decisions (does a save need a watchlist cleanup, may a title
/// join the watchlist at all) are made against this snapshot rather than by
/// issuing point queries per check.
#[derive(Debug, Default)]
pub struct WatchSets {
    watched: HashMap<(i32, MediaType), WatchedItem>,
    watchlist: HashSet<(i32, MediaType)>,
}

impl WatchSets {
    #[must_use]
    pub fn new(watched: Vec<WatchedItem>, watchlist: Vec<WatchlistItem>) -> Self {
        let watched = watched
            .into_iter()
            .filter_map(|item| {
                MediaType::parse(&item.r#type).map(|media_type| ((item.tmdb_id, media_type), item))
            })
            .collect();
        let watchlist = watchlist
            .into_iter()
            .filter_map(|item| MediaType::parse(&item.r#type).map(|t| (item.tmdb_id, t)))
            .collect();
        Self { watched, watchlist }
    }

    #[must_use]
    pub fn find_watched(&self, tmdb_id: i32, media_type: MediaType) -> Option<&WatchedItem> {
        self.watched.get(&(tmdb_id, media_type))
    }

    #[must_use]
    pub fn is_watched(&self, tmdb_id: i32, media_type: MediaType) -> bool {
        self.watched.contains_key(&(tmdb_id, media_type))
    }

    #[must_use]
    pub fn is_on_watchlist(&self, tmdb_id: i32, media_type: MediaType) -> bool {
        self.watchlist.contains(&(tmdb_id, media_type))
    }
}

/// Checks the fields every list write must carry. Returns the typed identity
/// triple of the item.
///
/// ```rust
/// use serde_json::json;
/// use watcharr::domain::MediaType;
/// use watcharr::services::watch_service::validate_item;
///
/// let item = json!({ "tmdbId": 603, "type": "movie", "title": "The Matrix" });
/// let (tmdb_id, media_type, title) = validate_item(item.as_object().unwrap()).unwrap();
/// assert_eq!(tmdb_id, 603);
/// assert_eq!(media_type, MediaType::Movie);
/// assert_eq!(title, "The Matrix");
/// ```
///
/// # Errors
///
/// Returns [`WatchError::InvalidItem`] when `tmdbId` is missing or not an
/// integer, `title` is missing or blank, or `type` is not `movie` / `tv`.
pub fn validate_item(item: &Map<String, Value>) -> Result<(i32, MediaType, String), WatchError> {
    let tmdb_id = item
        .get("tmdbId")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| WatchError::InvalidItem("tmdbId must be an integer".to_string()))?;

    let media_type = item
        .get("type")
        .and_then(Value::as_str)
        .and_then(MediaType::parse)
        .ok_or_else(|| WatchError::InvalidItem("type must be movie or tv".to_string()))?;

    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| WatchError::InvalidItem("title is required".to_string()))?;

    Ok((tmdb_id, media_type, title.to_string()))
}

/// Watched log and watchlist operations for one authenticated user.
///
/// Items cross this boundary as wire-shaped JSON maps. Writes are upserts on
/// the `(user, tmdbId, type)` identity so the caller never needs to know
/// whether a record already exists.
#[async_trait]
pub trait WatchService: Send + Sync {
    /// All watched items, most recently watched first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn watched_items(&self, user_id: &str) -> Result<Vec<Map<String, Value>>, WatchError>;

    /// Inserts or updates a watched item and returns the canonical stored
    /// record. A successful save also removes the title from the watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidItem`] for malformed payloads, or a
    /// database error if the write fails.
    async fn upsert_watched(
        &self,
        user_id: &str,
        item: Map<String, Value>,
    ) -> Result<Map<String, Value>, WatchError>;

    /// Deletes a watched item by row id.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::NotFound`] if no row with that id belongs to the
    /// user.
    async fn delete_watched(&self, user_id: &str, id: i32) -> Result<(), WatchError>;

    /// All watchlist entries, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn watchlist_items(&self, user_id: &str) -> Result<Vec<Map<String, Value>>, WatchError>;

    /// Adds a title to the watchlist and returns the canonical stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::AlreadyWatched`] without touching the store when
    /// the title is already in the watched log, or
    /// [`WatchError::InvalidItem`] for malformed payloads.
    async fn add_to_watchlist(
        &self,
        user_id: &str,
        item: Map<String, Value>,
    ) -> Result<Map<String, Value>, WatchError>;

    /// Removes a watchlist entry by its natural key. Returns whether an entry
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn remove_from_watchlist(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: MediaType,
    ) -> Result<bool, WatchError>;

    /// Loads the user's membership snapshot for form derivation and policy
    /// checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn sets_for_user(&self, user_id: &str) -> Result<WatchSets, WatchError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn watched_row(tmdb_id: i32, media_type: &str) -> WatchedItem {
        WatchedItem {
            id: 1,
            user_id: "admin".to_string(),
            tmdb_id,
            r#type: media_type.to_string(),
            title: "Something".to_string(),
            poster_path: None,
            release_year: None,
            watched_at: "2026-01-01T00:00:00Z".to_string(),
            rating: None,
            notes: None,
            is_favorite: None,
            runtime: None,
            watching_status: None,
            watched_progress_seconds: None,
            origin_country: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn watchlist_row(tmdb_id: i32, media_type: &str) -> WatchlistItem {
        WatchlistItem {
            id: 1,
            user_id: "admin".to_string(),
            tmdb_id,
            r#type: media_type.to_string(),
            title: "Something".to_string(),
            poster_path: None,
            release_year: None,
            added_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn sets_distinguish_media_types_for_the_same_id() {
        let sets = WatchSets::new(vec![watched_row(100, "movie")], vec![watchlist_row(100, "tv")]);

        assert!(sets.is_watched(100, MediaType::Movie));
        assert!(!sets.is_watched(100, MediaType::Tv));
        assert!(sets.is_on_watchlist(100, MediaType::Tv));
        assert!(!sets.is_on_watchlist(100, MediaType::Movie));
        assert!(sets.find_watched(100, MediaType::Movie).is_some());
    }

    #[test]
    fn validate_item_accepts_a_minimal_payload() {
        let item = json!({ "tmdbId": 1, "type": "tv", "title": "Dark" });
        let (tmdb_id, media_type, title) = validate_item(item.as_object().unwrap()).unwrap();
        assert_eq!((tmdb_id, media_type, title.as_str()), (1, MediaType::Tv, "Dark"));
    }

    #[test]
    fn validate_item_rejects_bad_fields() {
        let missing_id = json!({ "type": "movie", "title": "X" });
        assert!(validate_item(missing_id.as_object().unwrap()).is_err());

        let bad_type = json!({ "tmdbId": 1, "type": "book", "title": "X" });
        assert!(validate_item(bad_type.as_object().unwrap()).is_err());

        let blank_title = json!({ "tmdbId": 1, "type": "movie", "title": "   " });
        assert!(validate_item(blank_title.as_object().unwrap()).is_err());
    }

    #[test]
    fn error_display_is_actionable() {
        let err = WatchError::InvalidItem("tmdbId must be an integer".to_string());
        assert_eq!(
            err.to_string(),
            "invalid item payload: tmdbId must be an integer"
        );
        assert_eq!(
            WatchError::NotFound(9).to_string(),
            "watched item 9 not found"
        );
    }
}
