//! HTTP server initialization and runtime setup.
//!
//! Handles storage and cache setup and the Axum server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{RecordRepository, UserRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    MemoryRecordRepository, MemoryUserRepository, PgRecordRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, StateOptions};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

const CONNECT_ATTEMPTS: usize = 5;
const MAX_CONNECT_DELAY: Duration = Duration::from_secs(5);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record and credential stores (PostgreSQL with migrations, or in-memory)
/// - Redis resolve cache (or NullCache fallback)
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (records, users) = build_repositories(&config).await?;
    let cache = build_cache(&config).await;

    let state = AppState::new(records, users, cache, StateOptions::from(&config));
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Opens the configured record and credential stores.
async fn build_repositories(
    config: &Config,
) -> Result<(Arc<dyn RecordRepository>, Arc<dyn UserRepository>)> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = Arc::new(connect_pool(config).await?);

            sqlx::migrate!("./migrations")
                .run(pool.as_ref())
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            Ok((
                Arc::new(PgRecordRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(MemoryRecordRepository::new()),
                Arc::new(MemoryUserRepository::new()),
            ))
        }
    }
}

/// Connects to PostgreSQL, retrying with exponential backoff.
///
/// Connection acquisition is bounded by the store timeout so that a saturated
/// pool surfaces as a store failure instead of a hung request.
///
/// # Errors
///
/// Returns an error if no database URL is configured or every attempt fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.store_timeout_seconds));

    let pool = Retry::spawn(connect_backoff(), || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!("Database connection attempt failed: {}", e);
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Delays between connection attempts: 100ms doubling, capped at 5s.
fn connect_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(MAX_CONNECT_DELAY)
        .map(jitter)
        .take(CONNECT_ATTEMPTS - 1)
}

/// Connects the resolve cache, falling back to [`NullCache`].
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
