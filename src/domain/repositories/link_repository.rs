//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::RepositoryError;
use async_trait::async_trait;
use chrono::Duration;

/// Persistence contract consumed by [`crate::application::services::LinkService`].
///
/// Storage owns uniqueness of `code` among non-deleted rows and all
/// timestamp bookkeeping (`created_at`, `deleted_at`). Expiry is never
/// evaluated here; callers classify rows with [`Link::status`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UniqueViolation`] if a non-deleted row
    /// already holds `new_link.code`.
    async fn create(&self, new_link: NewLink) -> Result<Link, RepositoryError>;

    /// Finds a link by its code.
    ///
    /// Prefers the non-deleted row; falls back to the most recently deleted
    /// one still awaiting purge.
    async fn get_by_code(&self, code: &str) -> Result<Option<Link>, RepositoryError>;

    /// Finds a non-deleted link pointing at `url`.
    ///
    /// Rows that have not expired at storage-now win over expired ones; among
    /// equals the most recently created row is returned.
    async fn get_by_url(&self, url: &str) -> Result<Option<Link>, RepositoryError>;

    /// Adds one to the hit counter of the non-deleted row holding `code`.
    async fn increment_hit(&self, code: &str) -> Result<(), RepositoryError>;

    /// Adds one to the hit counter of row `id`, unless it has been deleted.
    async fn increment_hit_by_id(&self, id: i64) -> Result<(), RepositoryError>;

    /// Sets `deleted_at` to now on the non-deleted row holding `code`.
    ///
    /// Returns `Ok(false)` if no such row exists.
    async fn soft_delete(&self, code: &str) -> Result<bool, RepositoryError>;

    /// Sets `deleted_at` to now on row `id` if it is not deleted yet.
    ///
    /// Returns `Ok(false)` if the row is gone or was already deleted, so a
    /// caller acting on a row it read earlier never touches its successor.
    async fn soft_delete_by_id(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Physically removes soft-deleted rows whose `deleted_at` is older than
    /// `older_than`. Returns the number of rows removed.
    async fn purge_deleted(&self, older_than: Duration) -> Result<u64, RepositoryError>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
