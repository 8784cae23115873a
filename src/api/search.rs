use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::MediaType;
use crate::services::{PopularItem, SearchResult};

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub r#type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub r#type: Option<String>,
    pub region: Option<String>,
}

/// GET /search?q=..&type=..
/// Catalog title search. An unknown `type` falls back to movies; a blank
/// query returns an empty list.
pub async fn search_titles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResult>>>, ApiError> {
    let media_type = MediaType::parse_lenient(query.r#type.as_deref().unwrap_or("movie"));

    let results = state
        .catalog_service()
        .search(media_type, &query.q)
        .await?;
    Ok(Json(ApiResponse::success(results)))
}

/// GET /popular?type=..&region=..
/// Popular titles for one media type. Unlike search, an invalid `type` here
/// is rejected.
pub async fn popular_titles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<ApiResponse<Vec<PopularItem>>>, ApiError> {
    let media_type = MediaType::parse(query.r#type.as_deref().unwrap_or("movie"))
        .ok_or_else(|| ApiError::validation("type must be movie or tv"))?;

    let items = state
        .catalog_service()
        .popular(media_type, query.region.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(items)))
}
