use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::{Map, Value};

use super::fields::{opt_bool, opt_i32, opt_string, required_i32, required_string};
use crate::entities::{prelude::WatchedItems, watched_items};

/// Repository for the per-user watched log.
///
/// Write payloads arrive as snake_case JSON maps so that callers can express
/// partial updates: a key that is present (even as `null`) is written, a key
/// that is absent leaves the stored column untouched on conflict.
pub struct WatchedRepository {
    conn: DatabaseConnection,
}

impl WatchedRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All watched items for a user, most recently watched first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<watched_items::Model>> {
        WatchedItems::find()
            .filter(watched_items::Column::UserId.eq(user_id))
            .order_by_desc(watched_items::Column::WatchedAt)
            .all(&self.conn)
            .await
            .context("failed to list watched items")
    }

    pub async fn find_by_key(
        &self,
        user_id: &str,
        tmdb_id: i32,
        media_type: &str,
    ) -> Result<Option<watched_items::Model>> {
        WatchedItems::find()
            .filter(watched_items::Column::UserId.eq(user_id))
            .filter(watched_items::Column::TmdbId.eq(tmdb_id))
            .filter(watched_items::Column::Type.eq(media_type))
            .one(&self.conn)
            .await
            .context("failed to query watched item by key")
    }

    pub async fn count(&self) -> Result<u64> {
        WatchedItems::find()
            .count(&self.conn)
            .await
            .context("failed to count watched items")
    }

    /// Rows that never had an origin country resolved, across all users.
    pub async fn list_missing_origin_country(&self) -> Result<Vec<watched_items::Model>> {
        WatchedItems::find()
            .filter(watched_items::Column::OriginCountry.is_null())
            .order_by_asc(watched_items::Column::Id)
            .all(&self.conn)
            .await
            .context("failed to list watched items missing origin country")
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts or updates a watched row keyed by `(user_id, tmdb_id, type)`.
    ///
    /// Only the columns present in `row` are written on conflict; identity
    /// columns and `created_at` are never overwritten. Returns the canonical
    /// stored row.
    pub async fn upsert(&self, user_id: &str, row: &Map<String, Value>) -> Result<watched_items::Model> {
        let tmdb_id = required_i32(row, "tmdb_id")?;
        let media_type = required_string(row, "type")?;
        let title = required_string(row, "title")?;
        let watched_at = required_string(row, "watched_at")?;

        let mut update_cols = vec![
            watched_items::Column::Title,
            watched_items::Column::WatchedAt,
        ];
        let mut active = watched_items::ActiveModel {
            user_id: Set(user_id.to_owned()),
            tmdb_id: Set(tmdb_id),
            r#type: Set(media_type.clone()),
            title: Set(title),
            watched_at: Set(watched_at),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        if let Some(value) = row.get("poster_path") {
            active.poster_path = Set(opt_string(value, "poster_path")?);
            update_cols.push(watched_items::Column::PosterPath);
        }
        if let Some(value) = row.get("release_year") {
            active.release_year = Set(opt_string(value, "release_year")?);
            update_cols.push(watched_items::Column::ReleaseYear);
        }
        if let Some(value) = row.get("rating") {
            active.rating = Set(opt_i32(value, "rating")?);
            update_cols.push(watched_items::Column::Rating);
        }
        if let Some(value) = row.get("notes") {
            active.notes = Set(opt_string(value, "notes")?);
            update_cols.push(watched_items::Column::Notes);
        }
        if let Some(value) = row.get("is_favorite") {
            active.is_favorite = Set(opt_bool(value, "is_favorite")?);
            update_cols.push(watched_items::Column::IsFavorite);
        }
        if let Some(value) = row.get("runtime") {
            active.runtime = Set(opt_i32(value, "runtime")?);
            update_cols.push(watched_items::Column::Runtime);
        }
        if let Some(value) = row.get("watching_status") {
            active.watching_status = Set(opt_string(value, "watching_status")?);
            update_cols.push(watched_items::Column::WatchingStatus);
        }
        if let Some(value) = row.get("watched_progress_seconds") {
            active.watched_progress_seconds = Set(opt_i32(value, "watched_progress_seconds")?);
            update_cols.push(watched_items::Column::WatchedProgressSeconds);
        }
        if let Some(value) = row.get("origin_country") {
            active.origin_country = Set(opt_string(value, "origin_country")?);
            update_cols.push(watched_items::Column::OriginCountry);
        }

        WatchedItems::insert(active)
            .on_conflict(
                OnConflict::columns([
                    watched_items::Column::UserId,
                    watched_items::Column::TmdbId,
                    watched_items::Column::Type,
                ])
                .update_columns(update_cols)
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("failed to upsert watched item")?;

        self.find_by_key(user_id, tmdb_id, &media_type)
            .await?
            .context("watched item missing after upsert")
    }

    /// Deletes a row by id, scoped to its owner. Returns whether a row went away.
    pub async fn delete(&self, user_id: &str, id: i32) -> Result<bool> {
        let result = WatchedItems::delete_many()
            .filter(watched_items::Column::Id.eq(id))
            .filter(watched_items::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("failed to delete watched item")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn set_origin_country(&self, id: i32, origin_country: Option<String>) -> Result<bool> {
        let result = WatchedItems::update_many()
            .col_expr(watched_items::Column::OriginCountry, Expr::value(origin_country))
            .filter(watched_items::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("failed to update origin country")?;
        Ok(result.rows_affected > 0)
    }
}
