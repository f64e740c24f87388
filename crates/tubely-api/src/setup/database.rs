//! Database setup and initialization

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{InMemoryVideoStore, PgVideoStore, VideoStore};

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Pick the video store: PostgreSQL when `DATABASE_URL` is set, otherwise process memory.
pub async fn setup_store(config: &Config) -> Result<Arc<dyn VideoStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = setup_database(url, config.db_max_connections).await?;
            Ok(Arc::new(PgVideoStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory only");
            Ok(Arc::new(InMemoryVideoStore::new()))
        }
    }
}

/// Setup database connection pool and run migrations
pub async fn setup_database(url: &str, max_connections: u32) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Database connected successfully");

    // Workspace migrations/ relative to this crate
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
