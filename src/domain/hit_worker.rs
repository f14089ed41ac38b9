//! Background worker that turns [`HitEvent`]s into counter increments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::hit_event::HitEvent;
use crate::domain::repositories::LinkRepository;

/// Attempts per event after the first failure.
const MAX_RETRIES: usize = 3;

/// Drains the hit channel until every sender is dropped.
///
/// At most `concurrency` increments run at once. Failed increments are
/// retried with jittered exponential backoff and then logged; they are never
/// reported back to the resolver. The function returns only after all
/// in-flight increments have finished, so every accepted event is applied
/// exactly once before shutdown completes.
pub async fn run_hit_worker<R>(
    mut rx: mpsc::Receiver<HitEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: LinkRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            record_hit(repository.as_ref(), &event).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    tracing::info!("Hit worker stopped");
}

async fn record_hit<R>(repository: &R, event: &HitEvent)
where
    R: LinkRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_millis(500))
        .map(jitter)
        .take(MAX_RETRIES);

    let link_id = event.link_id;
    match Retry::spawn(strategy, move || repository.increment_hit_by_id(link_id)).await {
        Ok(()) => {
            metrics::counter!("link_hits_recorded_total").increment(1);
            tracing::debug!(code = %event.code, "Hit recorded");
        }
        Err(e) => {
            metrics::counter!("link_hits_failed_total").increment(1);
            tracing::warn!(
                code = %event.code,
                resolved_at = %event.resolved_at,
                error = %e,
                "Failed to record hit"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::RepositoryError;
    use chrono::Utc;

    #[tokio::test]
    async fn test_worker_applies_every_event_before_returning() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_hit_by_id()
            .withf(|id| *id == 3)
            .times(5)
            .returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(16);
        for _ in 0..5 {
            tx.send(HitEvent::new(3, "abc1234", Utc::now())).await.unwrap();
        }
        drop(tx);

        run_hit_worker(rx, Arc::new(repo), 2).await;
    }

    #[tokio::test]
    async fn test_worker_retries_transient_failures() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_increment_hit_by_id()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));
        repo.expect_increment_hit_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(1);
        tx.send(HitEvent::new(4, "retry01", Utc::now())).await.unwrap();
        drop(tx);

        run_hit_worker(rx, Arc::new(repo), 1).await;
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_retry_budget() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_hit_by_id()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));

        let (tx, rx) = mpsc::channel(1);
        tx.send(HitEvent::new(5, "broken1", Utc::now())).await.unwrap();
        drop(tx);

        run_hit_worker(rx, Arc::new(repo), 1).await;
    }
}
