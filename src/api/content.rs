//! The add/edit page for a single title: its catalog detail, the derived
//! form state, and the actions the page can submit.
//!
//! Every action funnels into the same watched-list upsert; the handlers here
//! only decide which payload the action builds.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::db::WatchedItem;
use crate::domain::MediaType;
use crate::services::catalog_service::ContentDetail;
use crate::services::{FormState, WatchSets, content_form, mapper};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    pub detail: ContentDetail,
    pub form: FormState,
    /// The stored watched record, `null` when the title has not been logged.
    pub existing: Option<Map<String, Value>>,
    pub in_watchlist: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRequest {
    pub watched_at: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub progress_minutes: Option<i32>,
    #[serde(default)]
    pub progress_seconds: Option<i32>,
    #[serde(default)]
    pub as_dropped: bool,
}

impl From<FormRequest> for FormState {
    fn from(request: FormRequest) -> Self {
        Self {
            watched_at: request.watched_at,
            notes: request.notes,
            rating: request.rating,
            is_favorite: request.is_favorite,
            progress_minutes: request.progress_minutes,
            progress_seconds: request.progress_seconds,
            as_dropped: request.as_dropped,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub item: Map<String, Value>,
    pub was_update: bool,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteToggleRequest {
    pub favorite: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleResponse {
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

fn parse_media_type(raw: &str) -> Result<MediaType, ApiError> {
    MediaType::parse(raw).ok_or_else(|| ApiError::validation("type must be movie or tv"))
}

async fn load_page_context(
    state: &AppState,
    user_id: &str,
    media_type: MediaType,
    tmdb_id: i32,
) -> Result<(ContentDetail, WatchSets), ApiError> {
    let detail = state.catalog_service().detail(media_type, tmdb_id).await?;
    let sets = state.watch_service().sets_for_user(user_id).await?;
    Ok((detail, sets))
}

fn existing_wire(item: Option<&WatchedItem>) -> Result<Option<Map<String, Value>>, ApiError> {
    item.map(mapper::model_to_item)
        .transpose()
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// GET /content/{type}/{id}
/// Everything the page needs in one response.
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<ContentPage>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let existing = sets.find_watched(tmdb_id, media_type);
    let now = Utc::now().to_rfc3339();

    Ok(Json(ApiResponse::success(ContentPage {
        form: FormState::derive(existing, &now),
        existing: existing_wire(existing)?,
        in_watchlist: sets.is_on_watchlist(tmdb_id, media_type),
        detail,
    })))
}

/// POST /content/{type}/{id}/save
/// Persist the form. Creates the watched record or updates it in place.
pub async fn save_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
    Json(request): Json<FormRequest>,
) -> Result<Json<ApiResponse<SaveResponse>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let existing = sets.find_watched(tmdb_id, media_type);
    let was_update = existing.is_some();
    let form = FormState::from(request);

    let payload = content_form::save_payload(&detail, &form, existing);
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;

    Ok(Json(ApiResponse::success(SaveResponse { item, was_update })))
}

/// POST /content/{type}/{id}/drop
/// Mark the title as dropped, keeping whatever rating and favorite flag the
/// stored record already carries.
pub async fn drop_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
    Json(request): Json<FormRequest>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let existing = sets.find_watched(tmdb_id, media_type);
    let form = FormState::from(request);
    let now = Utc::now().to_rfc3339();

    let payload = content_form::drop_payload(&detail, &form, existing, &now);
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;

    Ok(Json(ApiResponse::success(item)))
}

/// POST /content/{type}/{id}/restore
/// Remove the dropped status. Series resume as "watching"; movies end up
/// with no status at all.
pub async fn restore_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let existing = sets
        .find_watched(tmdb_id, media_type)
        .ok_or_else(|| ApiError::not_found("Watched item", tmdb_id))?;

    let payload = content_form::restore_payload(&detail, existing)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;

    Ok(Json(ApiResponse::success(item)))
}

/// POST /content/{type}/{id}/complete
/// Mark a series as completed and stamp the watch date.
pub async fn complete_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    if !media_type.is_tv() {
        return Err(ApiError::validation("Only series can be marked completed"));
    }
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let existing = sets
        .find_watched(tmdb_id, media_type)
        .ok_or_else(|| ApiError::not_found("Watched item", tmdb_id))?;
    let now = Utc::now().to_rfc3339();

    let payload = content_form::complete_payload(&detail, existing, &now)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;

    Ok(Json(ApiResponse::success(item)))
}

/// POST /content/{type}/{id}/favorite
/// Toggle the favorite heart. Without a stored record there is nothing to
/// write, so the response just echoes the flag back.
pub async fn favorite_content(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((raw_type, tmdb_id)): Path<(String, i32)>,
    Json(request): Json<FavoriteToggleRequest>,
) -> Result<Json<ApiResponse<FavoriteToggleResponse>>, ApiError> {
    let media_type = parse_media_type(&raw_type)?;
    let (detail, sets) = load_page_context(&state, &user.0, media_type, tmdb_id).await?;

    let Some(existing) = sets.find_watched(tmdb_id, media_type) else {
        return Ok(Json(ApiResponse::success(FavoriteToggleResponse {
            persisted: false,
            item: None,
            favorite: Some(request.favorite),
        })));
    };

    let payload = content_form::favorite_payload(&detail, existing, request.favorite)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;

    Ok(Json(ApiResponse::success(FavoriteToggleResponse {
        persisted: true,
        item: Some(item),
        favorite: None,
    })))
}
