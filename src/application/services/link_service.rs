//! Link lifecycle service: shorten, resolve, stats, delete and purge.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::clock::Clock;
use crate::domain::entities::{Link, LinkStatus, NewLink};
use crate::domain::hit_event::HitEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::LinkError;
use crate::utils::code_generator::{MAX_CODE_ATTEMPTS, code_length_for_attempt, generate_code};

/// Result of a successful [`LinkService::shorten`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortened {
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Link> for Shortened {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            expires_at: link.expires_at,
        }
    }
}

/// Service owning every link lifecycle rule.
///
/// Holds no state besides its collaborators: each call re-reads storage, and
/// uniqueness of codes is left to the repository. Expiry is evaluated lazily
/// against the injected [`Clock`].
pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    hits: mpsc::Sender<HitEvent>,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    /// Creates a new link service.
    ///
    /// `hits` feeds [`crate::domain::hit_worker::run_hit_worker`].
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, hits: mpsc::Sender<HitEvent>) -> Self {
        Self {
            repository,
            clock,
            hits,
        }
    }

    /// Creates a short link, or returns the live one already pointing at `url`.
    ///
    /// # Arguments
    ///
    /// - `url` - Target URL; surrounding whitespace is trimmed
    /// - `alias` - Caller-chosen code; `None` or blank means auto-generate
    /// - `ttl_days` - Lifetime in days; `0` means the link never expires
    ///
    /// # Alias Reservation
    ///
    /// A live holder of the alias makes the call fail with
    /// [`LinkError::AliasBusy`]. An expired holder is soft-deleted first so
    /// the alias can be reused; the delete targets the row that was read, so
    /// a racing caller that already reclaimed the alias keeps its new link. A concurrent creation that wins the race is
    /// detected through the storage unique constraint and also reported as
    /// [`LinkError::AliasBusy`].
    ///
    /// # Deduplication
    ///
    /// Without an alias, a live link for the exact same URL is returned
    /// unchanged, including its original expiry.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidInput`] if `url` is blank or `ttl_days` is out of range
    /// - [`LinkError::AliasBusy`] if the alias is held by a live link
    /// - [`LinkError::CodeGenerationExhausted`] if no free code was found
    /// - [`LinkError::Storage`] on repository failures
    pub async fn shorten(
        &self,
        url: &str,
        alias: Option<&str>,
        ttl_days: u32,
    ) -> Result<Shortened, LinkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(LinkError::InvalidInput("url must not be empty".to_string()));
        }

        let now = self.clock.now();
        let expires_at = expiry_for(now, ttl_days)?;

        match alias.map(str::trim).filter(|a| !a.is_empty()) {
            Some(alias) => self.shorten_with_alias(url, alias, expires_at, now).await,
            None => self.shorten_generated(url, expires_at, now).await,
        }
    }

    async fn shorten_with_alias(
        &self,
        url: &str,
        alias: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Shortened, LinkError> {
        if let Some(existing) = self.repository.get_by_code(alias).await? {
            match existing.status(now) {
                LinkStatus::Live => return Err(LinkError::AliasBusy(alias.to_string())),
                LinkStatus::Expired => {
                    tracing::debug!(code = %alias, id = existing.id, "Reclaiming expired alias");
                    self.repository.soft_delete_by_id(existing.id).await?;
                }
                LinkStatus::Deleted => {}
            }
        }

        let new_link = NewLink {
            code: alias.to_string(),
            url: url.to_string(),
            expires_at,
        };

        match self.repository.create(new_link).await {
            Ok(link) => {
                tracing::info!(code = %link.code, url = %link.url, "Link created with alias");
                Ok(link.into())
            }
            Err(e) if e.is_unique_violation() => Err(LinkError::AliasBusy(alias.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn shorten_generated(
        &self,
        url: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Shortened, LinkError> {
        if let Some(existing) = self.repository.get_by_url(url).await?
            && existing.is_live_at(now)
        {
            tracing::debug!(code = %existing.code, "Reusing live link for URL");
            return Ok(existing.into());
        }

        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(code_length_for_attempt(attempt), &mut rand::rng());

            if let Some(holder) = self.repository.get_by_code(&code).await? {
                match holder.status(now) {
                    LinkStatus::Live => continue,
                    LinkStatus::Expired => {
                        self.repository.soft_delete_by_id(holder.id).await?;
                    }
                    LinkStatus::Deleted => {}
                }
            }

            let new_link = NewLink {
                code: code.clone(),
                url: url.to_string(),
                expires_at,
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    tracing::info!(code = %link.code, url = %link.url, attempt, "Link created");
                    return Ok(link.into());
                }
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!(code = %code, attempt, "Generated code collided on insert");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LinkError::CodeGenerationExhausted)
    }

    /// Returns the target URL of a live link and schedules a hit.
    ///
    /// The hit is counted asynchronously; a full or closed hit queue is
    /// logged and the resolution still succeeds.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotFound`] if the code is blank, unknown, or deleted
    /// - [`LinkError::Expired`] if the link has expired
    pub async fn resolve(&self, code: &str) -> Result<String, LinkError> {
        let link = self.find_live(code).await?;
        self.record_hit(&link);
        Ok(link.url)
    }

    /// Returns the full record of a live link without counting a hit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn stats(&self, code: &str) -> Result<Link, LinkError> {
        self.find_live(code).await
    }

    /// Soft-deletes a live link. The row is removed later by the purge sweep.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotFound`] if the code is blank, unknown, already deleted,
    ///   or was deleted concurrently
    /// - [`LinkError::Expired`] if the link has expired
    pub async fn delete(&self, code: &str) -> Result<(), LinkError> {
        let link = self.find_live(code).await?;

        if !self.repository.soft_delete_by_id(link.id).await? {
            return Err(LinkError::NotFound);
        }

        tracing::info!(code = %link.code, "Link deleted");
        Ok(())
    }

    /// Physically removes links soft-deleted more than `older_than` ago.
    pub async fn purge_deleted(&self, older_than: Duration) -> Result<u64, LinkError> {
        Ok(self.repository.purge_deleted(older_than).await?)
    }

    /// Checks that storage is reachable.
    pub async fn health_check(&self) -> Result<(), LinkError> {
        Ok(self.repository.ping().await?)
    }

    /// Returns false once the hit worker has shut down.
    pub fn is_hit_queue_open(&self) -> bool {
        !self.hits.is_closed()
    }

    /// Free slots in the hit queue.
    pub fn hit_queue_capacity(&self) -> usize {
        self.hits.capacity()
    }

    async fn find_live(&self, code: &str) -> Result<Link, LinkError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LinkError::NotFound);
        }

        let link = self
            .repository
            .get_by_code(code)
            .await?
            .ok_or(LinkError::NotFound)?;

        match link.status(self.clock.now()) {
            LinkStatus::Live => Ok(link),
            LinkStatus::Expired => Err(LinkError::Expired),
            LinkStatus::Deleted => Err(LinkError::NotFound),
        }
    }

    fn record_hit(&self, link: &Link) {
        let event = HitEvent::new(link.id, link.code.as_str(), self.clock.now());

        match self.hits.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("link_hits_dropped_total").increment(1);
                tracing::warn!(code = %event.code, "Hit queue full, dropping hit");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("link_hits_dropped_total").increment(1);
                tracing::warn!(code = %event.code, "Hit queue closed, dropping hit");
            }
        }
    }
}

/// `now + ttl_days`, or `None` for links that never expire.
fn expiry_for(now: DateTime<Utc>, ttl_days: u32) -> Result<Option<DateTime<Utc>>, LinkError> {
    if ttl_days == 0 {
        return Ok(None);
    }

    Duration::try_days(i64::from(ttl_days))
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map(Some)
        .ok_or_else(|| LinkError::InvalidInput(format!("ttl_days {ttl_days} is out of range")))
}
