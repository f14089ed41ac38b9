//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the record of a live short link. Does not count as a hit.
///
/// # Endpoint
///
/// `GET /stats/{code}`
///
/// # Response
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "created_at": "2026-01-01T12:00:00Z",
///   "expires_at": null,
///   "hit_count": 3
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, deleted, or expired.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let link = state.link_service.stats(&code).await?;
    Ok(Json(link.into()))
}
