//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.base.environment,
        "Configuration loaded and validated successfully"
    );

    let videos = database::setup_store(&config).await?;
    let (thumbnail_storage, video_storage) = storage::setup_storage(&config).await?;

    let state = services::initialize_services(config, videos, thumbnail_storage, video_storage)?;

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
