use async_trait::async_trait;
use thiserror::Error;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::UnknownVideo(id),
            other => AppError::Database(other.to_string()),
        }
    }
}

/// Persistence for video records.
///
/// Updates replace the whole record. There is no compare-and-swap, so concurrent writers to
/// the same record race and the last one wins.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> StoreResult<Option<Video>>;

    /// Persist every mutable field of `video`. Fails with `NotFound` if the record is gone.
    async fn update_video(&self, video: &Video) -> StoreResult<()>;

    async fn create_video(&self, video: &Video) -> StoreResult<()>;

    /// Newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Video>>;

    /// Cheap connectivity check for health reporting.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
