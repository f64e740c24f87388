//! Storage backend setup, one backend per asset slot

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::{Config, StorageSlot};
use tubely_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Arc<dyn Storage>)> {
    let thumbnails = create_storage(config, StorageSlot::Thumbnail)
        .await
        .context("Failed to initialize thumbnail storage")?;
    let videos = create_storage(config, StorageSlot::Video)
        .await
        .context("Failed to initialize video storage")?;

    tracing::info!(
        thumbnail_backend = %thumbnails.backend_type(),
        video_backend = %videos.backend_type(),
        assets_root = %config.storage.assets_root.display(),
        "Storage initialized"
    );

    Ok((thumbnails, videos))
}
