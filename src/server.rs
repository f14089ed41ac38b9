//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker spawning, and the Axum server
//! lifecycle including graceful shutdown.

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::hit_worker::run_hit_worker;
use crate::domain::purge_worker::run_purge_worker;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Builds the PostgreSQL pool from the `DB_*` settings.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Applies pending migrations from `./migrations`.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Background hit worker
/// - Background purge worker
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the listener stops accepting connections, in-flight
/// requests finish, the purge worker is stopped and queued hits are flushed
/// before this function returns.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    migrate(&pool).await?;
    tracing::info!("Migrations applied");

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (hit_tx, hit_rx) = mpsc::channel(config.hit_queue_capacity);
    let hit_worker = tokio::spawn(run_hit_worker(
        hit_rx,
        repository.clone(),
        config.hit_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.hit_worker_concurrency,
        "Hit worker started"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let purge_worker = tokio::spawn(run_purge_worker(
        repository.clone(),
        config.purge_interval(),
        config.purge_retention(),
        shutdown_rx,
    ));
    tracing::info!("Purge worker started");

    let link_service = Arc::new(LinkService::new(repository, clock, hit_tx));
    let state = AppState::new(link_service, config.base_url.clone());

    let app = app_router(state, config.request_timeout());

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, draining background workers");

    // The router owned the last hit sender; once it is gone the worker drains and exits.
    let _ = shutdown_tx.send(true);
    if let Err(e) = purge_worker.await {
        tracing::error!(error = %e, "Purge worker terminated abnormally");
    }
    if let Err(e) = hit_worker.await {
        tracing::error!(error = %e, "Hit worker terminated abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
