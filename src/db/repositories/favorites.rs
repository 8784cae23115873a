use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{prelude::ProfileFavorites, profile_favorites};

/// Contents of one showcase slot.
#[derive(Debug, Clone)]
pub struct FavoriteSlot {
    pub media_type: String,
    pub position: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
}

/// Repository for the four showcase slots per media type on a user's profile.
pub struct FavoritesRepository {
    conn: DatabaseConnection,
}

impl FavoritesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All slots for a user, ordered by media type then slot position.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<profile_favorites::Model>> {
        ProfileFavorites::find()
            .filter(profile_favorites::Column::UserId.eq(user_id))
            .order_by_asc(profile_favorites::Column::Type)
            .order_by_asc(profile_favorites::Column::Position)
            .all(&self.conn)
            .await
            .context("failed to list profile favorites")
    }

    /// Fills a slot keyed by `(user_id, type, position)`, replacing whatever
    /// title held it before. Returns the canonical stored row.
    pub async fn set_slot(
        &self,
        user_id: &str,
        slot: &FavoriteSlot,
    ) -> Result<profile_favorites::Model> {
        let active = profile_favorites::ActiveModel {
            user_id: Set(user_id.to_owned()),
            r#type: Set(slot.media_type.clone()),
            position: Set(slot.position),
            tmdb_id: Set(slot.tmdb_id),
            title: Set(slot.title.clone()),
            poster_path: Set(slot.poster_path.clone()),
            release_year: Set(slot.release_year.clone()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        ProfileFavorites::insert(active)
            .on_conflict(
                OnConflict::columns([
                    profile_favorites::Column::UserId,
                    profile_favorites::Column::Type,
                    profile_favorites::Column::Position,
                ])
                .update_columns([
                    profile_favorites::Column::TmdbId,
                    profile_favorites::Column::Title,
                    profile_favorites::Column::PosterPath,
                    profile_favorites::Column::ReleaseYear,
                    profile_favorites::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("failed to upsert profile favorite")?;

        self.find_slot(user_id, &slot.media_type, slot.position)
            .await?
            .context("profile favorite missing after upsert")
    }

    /// Empties a slot. Returns whether a row went away.
    pub async fn clear_slot(&self, user_id: &str, media_type: &str, position: i32) -> Result<bool> {
        let result = ProfileFavorites::delete_many()
            .filter(profile_favorites::Column::UserId.eq(user_id))
            .filter(profile_favorites::Column::Type.eq(media_type))
            .filter(profile_favorites::Column::Position.eq(position))
            .exec(&self.conn)
            .await
            .context("failed to clear profile favorite slot")?;
        Ok(result.rows_affected > 0)
    }

    async fn find_slot(
        &self,
        user_id: &str,
        media_type: &str,
        position: i32,
    ) -> Result<Option<profile_favorites::Model>> {
        ProfileFavorites::find()
            .filter(profile_favorites::Column::UserId.eq(user_id))
            .filter(profile_favorites::Column::Type.eq(media_type))
            .filter(profile_favorites::Column::Position.eq(position))
            .one(&self.conn)
            .await
            .context("failed to query profile favorite slot")
    }
}
