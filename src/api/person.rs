use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::Person;

/// GET /person/{id}
/// A person with their movie and series credits.
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(person_id): Path<i32>,
) -> Result<Json<ApiResponse<Person>>, ApiError> {
    let person = state.catalog_service().person(person_id).await?;
    Ok(Json(ApiResponse::success(person)))
}
