//! API route configuration.

use crate::api::handlers::{delete_handler, shorten_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Link management routes.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short link
/// - `GET    /stats/{code}`   - Statistics for a live link
/// - `DELETE /delete/{code}`  - Soft-delete a link
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{code}", get(stats_handler))
        .route("/delete/{code}", delete(delete_handler))
}
