use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::api::auth::CurrentUser;

/// GET /watched
/// The user's watched log, most recently watched first.
pub async fn list_watched(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Map<String, Value>>>>, ApiError> {
    let items = state.watch_service().watched_items(&user.0).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /watched
/// Insert or update a watched item; responds with the canonical stored record.
pub async fn save_watched(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let item = state.watch_service().upsert_watched(&user.0, payload).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /watched/{id}
pub async fn delete_watched(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.watch_service().delete_watched(&user.0, id).await?;
    Ok(Json(ApiResponse::success(())))
}
