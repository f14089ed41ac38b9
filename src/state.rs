//! Shared state injected into every HTTP handler.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Link service over a type-erased repository, as used by the server.
pub type SharedLinkService = LinkService<dyn LinkRepository>;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<SharedLinkService>,
    /// Public base URL without a trailing slash, e.g. `https://s.example.com`.
    pub base_url: String,
}

impl AppState {
    pub fn new(link_service: Arc<SharedLinkService>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            link_service,
            base_url,
        }
    }

    /// Public redirect URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/r/{}", self.base_url, code)
    }
}
