//! Periodic physical removal of soft-deleted links.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::repositories::LinkRepository;

/// Runs [`LinkRepository::purge_deleted`] every `interval` until `shutdown`
/// flips to `true` or its sender is dropped.
///
/// The first sweep happens one full interval after start. Only rows whose
/// `deleted_at` is older than `retention` are removed, so the sweep never
/// touches rows the request path can still see.
pub async fn run_purge_worker<R>(
    repository: Arc<R>,
    interval: Duration,
    retention: chrono::Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    R: LinkRepository + ?Sized + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                purge_once(repository.as_ref(), retention).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Purge worker stopped");
}

/// A single sweep. Errors are logged and the next tick tries again.
pub async fn purge_once<R>(repository: &R, retention: chrono::Duration) -> Option<u64>
where
    R: LinkRepository + ?Sized,
{
    match repository.purge_deleted(retention).await {
        Ok(count) => {
            if count > 0 {
                metrics::counter!("links_purged_total").increment(count);
                tracing::info!(count, "Purged deleted links");
            }
            Some(count)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to purge deleted links");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::RepositoryError;

    #[tokio::test]
    async fn test_purge_once_passes_retention() {
        let mut repo = MockLinkRepository::new();
        repo.expect_purge_deleted()
            .withf(|older_than| *older_than == chrono::Duration::hours(24))
            .times(1)
            .returning(|_| Ok(3));

        let purged = purge_once(&repo, chrono::Duration::hours(24)).await;
        assert_eq!(purged, Some(3));
    }

    #[tokio::test]
    async fn test_purge_once_swallows_errors() {
        let mut repo = MockLinkRepository::new();
        repo.expect_purge_deleted()
            .times(1)
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));

        assert_eq!(purge_once(&repo, chrono::Duration::hours(1)).await, None);
    }

    #[tokio::test]
    async fn test_worker_sweeps_on_interval_and_stops_on_shutdown() {
        let mut repo = MockLinkRepository::new();
        repo.expect_purge_deleted().returning(|_| Ok(0));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_purge_worker(
            Arc::new(repo),
            Duration::from_millis(10),
            chrono::Duration::hours(24),
            rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_sender_dropped() {
        let repo = MockLinkRepository::new();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_purge_worker(
            Arc::new(repo),
            Duration::from_secs(3600),
            chrono::Duration::hours(24),
            rx,
        ));

        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
