#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use link_shortener::application::services::LinkService;
use link_shortener::domain::clock::ManualClock;
use link_shortener::domain::hit_worker::run_hit_worker;
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::persistence::InMemoryLinkRepository;
use link_shortener::state::{AppState, SharedLinkService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const BASE_URL: &str = "http://localhost:8080";

/// Fixed start instant so expiry assertions do not depend on wall time.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

/// In-memory service graph with a controllable clock and a running hit worker.
pub struct TestContext {
    pub state: AppState,
    pub clock: ManualClock,
    pub repository: Arc<InMemoryLinkRepository>,
    pub hit_worker: JoinHandle<()>,
}

impl TestContext {
    pub fn service(&self) -> &SharedLinkService {
        self.state.link_service.as_ref()
    }
}

pub fn create_test_context() -> TestContext {
    create_test_context_with_queue(100)
}

pub fn create_test_context_with_queue(capacity: usize) -> TestContext {
    let clock = ManualClock::new(epoch());
    let repository = Arc::new(InMemoryLinkRepository::with_clock(Arc::new(clock.clone())));

    let (tx, rx) = mpsc::channel(capacity);
    let hit_worker = tokio::spawn(run_hit_worker(rx, repository.clone(), 4));

    let dyn_repository: Arc<dyn LinkRepository> = repository.clone();
    let link_service = Arc::new(LinkService::new(dyn_repository, Arc::new(clock.clone()), tx));
    let state = AppState::new(link_service, BASE_URL);

    TestContext {
        state,
        clock,
        repository,
        hit_worker,
    }
}

/// Polls the stored hit counter until it reaches `expected` or a second passes.
pub async fn wait_for_hits(repository: &InMemoryLinkRepository, code: &str, expected: i64) -> i64 {
    let mut current = 0;
    for _ in 0..100 {
        current = repository
            .get_by_code(code)
            .await
            .unwrap()
            .map(|l| l.hit_count)
            .unwrap_or(0);
        if current >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    current
}
