use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::models::Video;
use uuid::Uuid;

use crate::store::{StoreError, StoreResult, VideoStore};

/// Process-local video records, used when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> StoreResult<Option<Video>> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, video: &Video) -> StoreResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(video.id)),
        }
    }

    async fn create_video(&self, video: &Video) -> StoreResult<()> {
        self.videos.write().await.insert(video.id, video.clone());
        Ok(())
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Video>> {
        let mut videos: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}
