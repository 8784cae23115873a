use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::{Map, Value};

use super::fields::{opt_string, required_i32, required_string};
use crate::entities::{prelude::WatchlistItems, watchlist_items};

/// Repository for the per-user plan-to-watch list.
pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All watchlist entries for a user, most recently added first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<watchlist_items::Model>> {
        WatchlistItems::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .order_by_desc(watchlist_items::Column::AddedAt)
            .all(&self.conn)
            .await
            .context("failed to list watchlist items")
    }

    pub async fn find_by_key(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: &str,
    ) -> Result<Option<watchlist_items::Model>> {
        WatchlistItems::find()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::TmdbId.eq(tmdb_id))
            .filter(watchlist_items::Column::Type.eq(media_type))
            .one(&self.conn)
            .await
            .context("failed to query watchlist item by key")
    }

    pub async fn count(&self) -> Result<u64> {
        WatchlistItems::find()
            .count(&self.conn)
            .await
            .context("failed to count watchlist items")
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts or refreshes an entry keyed by `(user_id, tmdb_id, type)` and
    /// returns the canonical stored row.
    pub async fn upsert(
        &self,
        user_id: &str,
        row: &Map<String, Value>,
    ) -> Result<watchlist_items::Model> {
        let tmdb_id = required_i32(row, "tmdb_id")?;
        let media_type = required_string(row, "type")?;
        let title = required_string(row, "title")?;
        let added_at = required_string(row, "added_at")?;

        let poster_path = match row.get("poster_path") {
            Some(value) => opt_string(value, "poster_path")?,
            None => None,
        };
        let release_year = match row.get("release_year") {
            Some(value) => opt_string(value, "release_year")?,
            None => None,
        };

        let active = watchlist_items::ActiveModel {
            user_id: Set(user_id.to_owned()),
            tmdb_id: Set(tmdb_id),
            r#type: Set(media_type.clone()),
            title: Set(title),
            poster_path: Set(poster_path),
            release_year: Set(release_year),
            added_at: Set(added_at),
            ..Default::default()
        };

        WatchlistItems::insert(active)
            .on_conflict(
                OnConflict::columns([
                    watchlist_items::Column::UserId,
                    watchlist_items::Column::TmdbId,
                    watchlist_items::Column::Type,
                ])
                .update_columns([
                    watchlist_items::Column::Title,
                    watchlist_items::Column::PosterPath,
                    watchlist_items::Column::ReleaseYear,
                    watchlist_items::Column::AddedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("failed to upsert watchlist item")?;

        self.find_by_key(user_id, tmdb_id, &media_type)
            .await?
            .context("watchlist item missing after upsert")
    }

    /// Removes an entry by its natural key. Returns whether a row went away.
    pub async fn remove(&self, user_id: &str, tmdb_id: i32, media_type: &str) -> Result<bool> {
        let result = WatchlistItems::delete_many()
            .filter(watchlist_items::Column::UserId.eq(user_id))
            .filter(watchlist_items::Column::TmdbId.eq(tmdb_id))
            .filter(watchlist_items::Column::Type.eq(media_type))
            .exec(&self.conn)
            .await
            .context("failed to remove watchlist item")?;
        Ok(result.rows_affected > 0)
    }
}
