use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::db::Store;
use crate::domain::MediaType;
use crate::services::mapper;
use crate::services::watch_service::{WatchError, WatchService, WatchSets, validate_item};

/// Store-backed implementation of [`WatchService`].
pub struct SeaOrmWatchService {
    store: Arc<Store>,
}

impl SeaOrmWatchService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Fills a timestamp column with "now" when the wire payload left it out
    /// or sent `null`.
    fn default_timestamp(row: &mut Map<String, Value>, key: &str) {
        let missing = !matches!(row.get(key), Some(Value::String(_)));
        if missing {
            row.insert(key.to_string(), Value::String(Utc::now().to_rfc3339()));
        }
    }
}

#[async_trait]
impl WatchService for SeaOrmWatchService {
    async fn watched_items(&self, user_id: &str) -> Result<Vec<Map<String, Value>>, WatchError> {
        let models = self.store.list_watched(user_id).await?;
        models
            .iter()
            .map(|model| mapper::model_to_item(model).map_err(WatchError::from))
            .collect()
    }

    async fn upsert_watched(
        &self,
        user_id: &str,
        item: Map<String, Value>,
    ) -> Result<Map<String, Value>, WatchError> {
        let (tmdb_id, media_type, title) = validate_item(&item)?;
        let sets = self.sets_for_user(user_id).await?;

        let mut row = mapper::to_row(&item);
        Self::default_timestamp(&mut row, "watched_at");

        let saved = self.store.upsert_watched(user_id, &row).await?;

        if sets.is_on_watchlist(tmdb_id, media_type) {
            self.store
                .remove_from_watchlist(user_id, tmdb_id, media_type.as_str())
                .await?;
            debug!("Cleared watchlist entry for {title} ({media_type}/{tmdb_id}) after save");
        }

        Ok(mapper::model_to_item(&saved)?)
    }

    async fn delete_watched(&self, user_id: &str, id: i32) -> Result<(), WatchError> {
        let removed = self.store.delete_watched(user_id, id).await?;
        if removed {
            Ok(())
        } else {
            Err(WatchError::NotFound(id))
        }
    }

    async fn watchlist_items(&self, user_id: &str) -> Result<Vec<Map<String, Value>>, WatchError> {
        let models = self.store.list_watchlist(user_id).await?;
        models
            .iter()
            .map(|model| mapper::model_to_item(model).map_err(WatchError::from))
            .collect()
    }

    async fn add_to_watchlist(
        &self,
        user_id: &str,
        item: Map<String, Value>,
    ) -> Result<Map<String, Value>, WatchError> {
        let (tmdb_id, media_type, _title) = validate_item(&item)?;
        let sets = self.sets_for_user(user_id).await?;

        // Already-watched titles never reach the store.
        if sets.is_watched(tmdb_id, media_type) {
            return Err(WatchError::AlreadyWatched);
        }

        let mut row = mapper::to_row(&item);
        Self::default_timestamp(&mut row, "added_at");

        let saved = self.store.upsert_watchlist(user_id, &row).await?;
        Ok(mapper::model_to_item(&saved)?)
    }

    async fn remove_from_watchlist(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: MediaType,
    ) -> Result<bool, WatchError> {
        let removed = self
            .store
            .remove_from_watchlist(user_id, tmdb_id, media_type.as_str())
            .await?;
        Ok(removed)
    }

    async fn sets_for_user(&self, user_id: &str) -> Result<WatchSets, WatchError> {
        let (watched, watchlist) = tokio::join!(
            self.store.list_watched(user_id),
            self.store.list_watchlist(user_id),
        );
        Ok(WatchSets::new(watched?, watchlist?))
    }
}
