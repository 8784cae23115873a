use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{BackfillReport, backfill};

/// POST /backfill-origin-country
/// Fill in the origin country for watched rows that predate the column.
/// Runs synchronously; large libraries take a while because lookups are
/// throttled.
pub async fn backfill_origin_country(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BackfillReport>>, ApiError> {
    let report = backfill::run(state.store(), state.tmdb()).await?;
    Ok(Json(ApiResponse::success(report)))
}
