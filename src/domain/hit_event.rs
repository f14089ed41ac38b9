//! Hit event model for asynchronous hit counting.

use chrono::{DateTime, Utc};

/// A successful resolution waiting to be counted.
///
/// Sent from [`crate::application::services::LinkService::resolve`] to
/// [`crate::domain::hit_worker::run_hit_worker`] through a bounded channel,
/// so the redirect never waits on the counter update.
///
/// The hit is applied to `link_id`, the row that was resolved. If that row is
/// deleted before the worker runs, the hit is lost rather than credited to a
/// later link reusing the same code.
#[derive(Debug, Clone, PartialEq)]
pub struct HitEvent {
    pub link_id: i64,
    pub code: String,
    pub resolved_at: DateTime<Utc>,
}

impl HitEvent {
    pub fn new(link_id: i64, code: impl Into<String>, resolved_at: DateTime<Utc>) -> Self {
        Self {
            link_id,
            code: code.into(),
            resolved_at,
        }
    }
}
