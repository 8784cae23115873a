use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, FavoriteDto, FavoritesResponse};
use crate::api::auth::CurrentUser;
use crate::constants::limits::FAVORITE_SLOTS;
use crate::db::FavoriteSlot;
use crate::domain::MediaType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFavoriteRequest {
    pub r#type: String,
    pub position: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub r#type: String,
    pub position: i32,
}

fn validated_slot(media_type: &str, position: i32) -> Result<MediaType, ApiError> {
    let media_type = MediaType::parse(media_type)
        .ok_or_else(|| ApiError::validation("type must be movie or tv"))?;
    if !(1..=FAVORITE_SLOTS).contains(&position) {
        return Err(ApiError::validation(format!(
            "position must be between 1 and {FAVORITE_SLOTS}"
        )));
    }
    Ok(media_type)
}

/// GET /profile-favorites
/// Both showcase rows as fixed-length slot arrays.
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<FavoritesResponse>>, ApiError> {
    let rows = state.store().list_profile_favorites(&user.0).await?;
    Ok(Json(ApiResponse::success(FavoritesResponse::from_rows(
        &rows,
    ))))
}

/// POST /profile-favorites
/// Put a title into one of the four showcase slots for its media type.
pub async fn set_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SetFavoriteRequest>,
) -> Result<Json<ApiResponse<FavoriteDto>>, ApiError> {
    let media_type = validated_slot(&payload.r#type, payload.position)?;
    if payload.tmdb_id <= 0 {
        return Err(ApiError::validation("tmdbId must be a positive integer"));
    }
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }

    let slot = FavoriteSlot {
        media_type: media_type.as_str().to_string(),
        position: payload.position,
        tmdb_id: payload.tmdb_id,
        title: payload.title,
        poster_path: payload.poster_path,
        release_year: payload.release_year,
    };
    let stored = state.store().set_profile_favorite(&user.0, &slot).await?;

    Ok(Json(ApiResponse::success(FavoriteDto {
        position: stored.position,
        tmdb_id: stored.tmdb_id,
        title: stored.title,
        poster_path: stored.poster_path,
        release_year: stored.release_year,
    })))
}

/// DELETE /profile-favorites?type=..&position=..
pub async fn clear_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let media_type = validated_slot(&query.r#type, query.position)?;

    let cleared = state
        .store()
        .clear_profile_favorite(&user.0, media_type.as_str(), query.position)
        .await?;
    if !cleared {
        return Err(ApiError::NotFound(format!(
            "No favorite in {} slot {}",
            media_type, query.position
        )));
    }
    Ok(Json(ApiResponse::success(())))
}
