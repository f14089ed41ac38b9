//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "alias": "my-link",   // optional, trimmed; blank means generate
///   "ttl_days": 7         // optional, 0 or absent means no expiry
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": "my-link",
///   "short_url": "http://localhost:8080/r/my-link"
/// }
/// ```
///
/// Without an alias, shortening a URL that already has a live link returns
/// that link instead of creating a new one.
///
/// # Errors
///
/// - 400 Bad Request on malformed JSON or failed validation
/// - 409 Conflict if the alias is held by a live link
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    let payload = payload.normalized();
    payload.validate()?;

    let shortened = state
        .link_service
        .shorten(
            &payload.url,
            payload.alias.as_deref(),
            payload.ttl_days.unwrap_or(0),
        )
        .await?;

    let short_url = state.short_url(&shortened.code);

    Ok(Json(ShortenResponse {
        code: shortened.code,
        short_url,
    }))
}
