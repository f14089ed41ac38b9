//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// Lifecycle state of a link, derived at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Resolvable, visible in stats, and holding its code.
    Live,
    /// `expires_at` has passed; the row still exists until it is reclaimed.
    Expired,
    /// Soft-deleted; waiting for the purge sweep.
    Deleted,
}

/// A shortened URL with its bookkeeping.
///
/// `id`, `created_at`, `hit_count` and `deleted_at` are owned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub hit_count: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        code: String,
        url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            code,
            url,
            created_at,
            expires_at,
            hit_count: 0,
            deleted_at: None,
        }
    }

    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link's expiry is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Classifies the link. Deletion wins over expiry.
    pub fn status(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_deleted() {
            LinkStatus::Deleted
        } else if self.is_expired_at(now) {
            LinkStatus::Expired
        } else {
            LinkStatus::Live
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == LinkStatus::Live
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub code: String,
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>, deleted_at: Option<DateTime<Utc>>) -> Link {
        Link {
            deleted_at,
            ..Link::new(
                1,
                "abc1234".to_string(),
                "https://example.com".to_string(),
                Utc::now(),
                expires_at,
            )
        }
    }

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "abc1234".to_string(),
            "https://example.com".to_string(),
            now,
            None,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.code, "abc1234");
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.created_at, now);
        assert_eq!(link.hit_count, 0);
        assert!(!link.is_deleted());
        assert_eq!(link.status(now), LinkStatus::Live);
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let link = link(None, None);
        assert!(!link.is_expired_at(Utc::now() + Duration::days(365 * 100)));
    }

    #[test]
    fn test_link_is_expired() {
        let now = Utc::now();
        let link = link(Some(now - Duration::seconds(1)), None);
        assert!(link.is_expired_at(now));
        assert_eq!(link.status(now), LinkStatus::Expired);
        assert!(!link.is_live_at(now));
    }

    #[test]
    fn test_link_expires_exactly_at_deadline() {
        let now = Utc::now();
        let link = link(Some(now), None);
        assert_eq!(link.status(now), LinkStatus::Expired);
        assert_eq!(link.status(now - Duration::milliseconds(1)), LinkStatus::Live);
    }

    #[test]
    fn test_deleted_takes_precedence_over_expired() {
        let now = Utc::now();
        let link = link(Some(now - Duration::days(1)), Some(now));
        assert!(link.is_deleted());
        assert_eq!(link.status(now), LinkStatus::Deleted);
    }
}
