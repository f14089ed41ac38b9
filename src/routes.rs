//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST   /shorten`        - Create a short link
//! - `GET    /r/{code}`       - Short link redirect
//! - `GET    /{code}`         - Short link redirect (bare form)
//! - `GET    /stats/{code}`   - Link statistics
//! - `DELETE /delete/{code}`  - Soft-delete a link
//! - `GET    /health`         - Health check: DB, hit queue
//!
//! Static routes take precedence over the bare `/{code}` capture, so
//! `/health` and `/shorten` are never treated as codes.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Per-request deadline, answered with `408 Request Timeout`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::TimeoutLayer;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `request_timeout` - deadline applied to every request
pub fn app_router(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/r/{code}", get(redirect_handler))
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(api::routes::link_routes())
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
