//! Handler for link deletion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppError;
use crate::state::AppState;

/// Soft-deletes a live short link.
///
/// # Endpoint
///
/// `DELETE /delete/{code}`
///
/// The code stops resolving immediately and becomes available for reuse.
/// The row itself is removed by the purge worker after the retention period.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, already deleted, or expired.
pub async fn delete_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
