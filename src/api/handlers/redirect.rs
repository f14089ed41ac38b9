//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /r/{code}` and `GET /{code}`
///
/// # Hit Tracking
///
/// A hit event is queued for the background worker before the response is
/// sent. If the queue is full, the hit is dropped and the redirect still
/// succeeds.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, deleted, or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.link_service.resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
