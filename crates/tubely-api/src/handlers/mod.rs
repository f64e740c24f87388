pub mod health;
pub mod thumbnail_upload;
pub mod video_create;
pub mod video_get;
pub mod video_upload;

use tubely_core::{AppError, AppResult};
use uuid::Uuid;

/// Path IDs are taken as strings so a malformed ID renders as our JSON 400.
pub(crate) fn parse_video_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))
}
