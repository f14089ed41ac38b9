//! DTOs for link statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// Statistics for a live short link.
///
/// `expires_at` is always present and `null` for links that never expire.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub hit_count: i64,
}

impl From<Link> for StatsResponse {
    fn from(link: Link) -> Self {
        Self {
            url: link.url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            hit_count: link.hit_count,
        }
    }
}
