use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;
use crate::domain::MediaType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub tmdb_id: i32,
    pub r#type: String,
}

/// GET /watchlist
/// The user's watchlist, most recently added first.
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Map<String, Value>>>>, ApiError> {
    let items = state.watch_service().watchlist_items(&user.0).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /watchlist
/// Add a title to the watchlist. Titles already in the watched log are
/// rejected.
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let item = state
        .watch_service()
        .add_to_watchlist(&user.0, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /watchlist?tmdbId=..&type=..
pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let media_type = MediaType::parse(&query.r#type)
        .ok_or_else(|| ApiError::validation("type must be movie or tv"))?;

    let removed = state
        .watch_service()
        .remove_from_watchlist(&user.0, query.tmdb_id, media_type)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Watchlist entry", query.tmdb_id));
    }
    Ok(Json(ApiResponse::success(())))
}
