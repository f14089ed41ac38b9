//! Process-local implementation of the link repository.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::RepositoryError;

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    rows: Vec<Link>,
}

impl Store {
    fn active_mut(&mut self, code: &str) -> Option<&mut Link> {
        self.rows
            .iter_mut()
            .find(|l| l.code == code && !l.is_deleted())
    }

    fn active_by_id_mut(&mut self, id: i64) -> Option<&mut Link> {
        self.rows
            .iter_mut()
            .find(|l| l.id == id && !l.is_deleted())
    }
}

/// In-memory link store with the same guarantees as the PostgreSQL one.
///
/// Every operation runs inside a single critical section, so the
/// check-and-insert in [`LinkRepository::create`] is atomic and two racing
/// creations of the same code yield exactly one success. Timestamps come from
/// the injected [`Clock`].
pub struct InMemoryLinkRepository {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty repository that stamps rows with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                rows: Vec::new(),
            }),
            clock,
        }
    }

    /// Number of physical rows, including soft-deleted ones.
    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, RepositoryError> {
        let now = self.clock.now();
        let mut store = self.lock();

        if store.active_mut(&new_link.code).is_some() {
            return Err(RepositoryError::UniqueViolation {
                code: new_link.code,
            });
        }

        let id = store.next_id;
        store.next_id += 1;

        let link = Link::new(id, new_link.code, new_link.url, now, new_link.expires_at);
        store.rows.push(link.clone());

        Ok(link)
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Link>, RepositoryError> {
        let store = self.lock();

        let active = store
            .rows
            .iter()
            .find(|l| l.code == code && !l.is_deleted());

        let found = active.or_else(|| {
            store
                .rows
                .iter()
                .filter(|l| l.code == code)
                .max_by_key(|l| (l.deleted_at, l.id))
        });

        Ok(found.cloned())
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Link>, RepositoryError> {
        let now = self.clock.now();
        let store = self.lock();

        Ok(store
            .rows
            .iter()
            .filter(|l| l.url == url && !l.is_deleted())
            .max_by_key(|l| (!l.is_expired_at(now), l.created_at, l.id))
            .cloned())
    }

    async fn increment_hit(&self, code: &str) -> Result<(), RepositoryError> {
        if let Some(link) = self.lock().active_mut(code) {
            link.hit_count += 1;
        }
        Ok(())
    }

    async fn increment_hit_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        if let Some(link) = self.lock().active_by_id_mut(id) {
            link.hit_count += 1;
        }
        Ok(())
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, RepositoryError> {
        let now = self.clock.now();

        match self.lock().active_mut(code) {
            Some(link) => {
                link.deleted_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let now = self.clock.now();

        match self.lock().active_by_id_mut(id) {
            Some(link) => {
                link.deleted_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_deleted(&self, older_than: Duration) -> Result<u64, RepositoryError> {
        let cutoff = self.clock.now() - older_than;
        let mut store = self.lock();

        let before = store.rows.len();
        store
            .rows
            .retain(|l| !l.deleted_at.is_some_and(|deleted_at| deleted_at < cutoff));

        Ok((before - store.rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
