//! Read-time URL resolution for stored asset references

use tubely_core::models::{StorageReference, Video, VideoResponse};
use tubely_core::{AppResult, StorageSlot};

use crate::state::AppState;

/// Turns private `bucket_key` references into freshly signed URLs.
///
/// Applied on every read path and never before persisting, so stored records keep the
/// durable reference and clients always get a URL that is valid now.
pub struct UrlResolver<'a> {
    state: &'a AppState,
}

impl<'a> UrlResolver<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn resolve_video(&self, mut video: Video) -> AppResult<Video> {
        video.thumbnail = self
            .resolve_slot(StorageSlot::Thumbnail, video.thumbnail.take())
            .await?;
        video.video = self
            .resolve_slot(StorageSlot::Video, video.video.take())
            .await?;
        Ok(video)
    }

    pub async fn to_response(&self, video: Video) -> AppResult<VideoResponse> {
        Ok(self.resolve_video(video).await?.into())
    }

    async fn resolve_slot(
        &self,
        slot: StorageSlot,
        reference: Option<StorageReference>,
    ) -> AppResult<Option<StorageReference>> {
        match reference {
            Some(reference @ StorageReference::BucketKey { .. }) => {
                let url = self.state.storage_for(slot).resolve(&reference).await?;
                Ok(Some(StorageReference::url(url)))
            }
            other => Ok(other),
        }
    }
}
