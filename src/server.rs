//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::application::services::{AuthService, LinkService, RateLimiter};
use crate::config::Config;
use crate::domain::background_task::TaskQueue;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::domain::task_worker::{TaskExecutor, spawn_workers};
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Connection attempts before startup gives up on PostgreSQL.
const DB_CONNECT_ATTEMPTS: usize = 5;

/// How long shutdown waits for workers to drain the task queue.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between purges of expired in-memory cache entries.
const MEMORY_CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry) and migrations
/// - Redis cache (or the in-memory fallback)
/// - Background task queue and worker pool
/// - Rate limiter and its sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = build_cache(&config).await;

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let user_repository: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));

    let (tasks, task_rx) = TaskQueue::channel(config.task_queue_capacity);
    let executor = Arc::new(TaskExecutor::new(
        link_repository.clone(),
        cache.clone(),
        Duration::from_secs(config.cache_ttl_seconds),
    ));
    let workers = spawn_workers(task_rx, executor, config.background_workers);
    tracing::info!(workers = workers.len(), "Background workers started");

    let rate_limiter = Arc::new(RateLimiter::new(
        NonZeroU32::new(config.rate_limit_burst).context("RATE_LIMIT_BURST must be positive")?,
        NonZeroU32::new(config.rate_limit_per_second)
            .context("RATE_LIMIT_PER_SECOND must be positive")?,
    ));
    let sweeper = rate_limiter
        .clone()
        .spawn_sweeper(Duration::from_secs(config.rate_limit_sweep_seconds));

    let link_service = Arc::new(LinkService::new(
        link_repository,
        cache.clone(),
        tasks.clone(),
        config.code_length,
    ));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        &config.jwt_secret,
        chrono::Duration::hours(config.token_ttl_hours),
    ));

    let state = AppState::new(
        link_service,
        auth_service,
        rate_limiter,
        cache,
        tasks,
        config.behind_proxy,
    );

    let app = app_router(state, &config.static_dir);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last queue senders, so workers now drain and exit.
    sweeper.abort();
    drain_workers(workers).await;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(200)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS - 1);

    let url = config.database_url.as_str();
    Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(url)
                .await
                .inspect_err(|e| tracing::warn!("Database connection attempt failed: {}", e))
        }
    })
    .await
    .context("Failed to connect to database")
}

async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            }
        }
    } else {
        tracing::info!("Redis not configured, using in-memory cache");
    }

    let memory = Arc::new(MemoryCache::new());
    let purged = memory.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(MEMORY_CACHE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            purged.purge_expired();
        }
    });
    memory
}

async fn drain_workers(workers: Vec<tokio::task::JoinHandle<()>>) {
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Background worker failed: {}", e);
            }
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!("Timed out waiting for background workers to drain");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
