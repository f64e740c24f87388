//! Media tools and application state

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoStore;
use tubely_processing::{FfmpegRemuxer, FfprobeInspector, ToolLimiter};
use tubely_storage::Storage;

pub fn initialize_services(
    config: Config,
    videos: Arc<dyn VideoStore>,
    thumbnail_storage: Arc<dyn Storage>,
    video_storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    // ffprobe and ffmpeg share one bound
    let limiter = ToolLimiter::new(config.media.max_concurrent_media_tools);

    let inspector = FfprobeInspector::new(config.media.ffprobe_path.clone(), limiter.clone())
        .context("Invalid FFPROBE_PATH")?;
    let remuxer = FfmpegRemuxer::new(config.media.ffmpeg_path.clone(), limiter.clone())
        .context("Invalid FFMPEG_PATH")?;

    tracing::info!(
        ffprobe_path = %config.media.ffprobe_path,
        ffmpeg_path = %config.media.ffmpeg_path,
        max_concurrent_media_tools = limiter.max_concurrent(),
        "Media tools configured"
    );

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        videos,
        thumbnail_storage,
        video_storage,
        inspector: Arc::new(inspector),
        remuxer: Arc::new(remuxer),
    }))
}
