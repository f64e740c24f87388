//! Upload orchestration
//!
//! Both uploads share one entry policy: parse the video ID, authenticate, load the record,
//! check ownership, then read the multipart body. Nothing is written anywhere until all of
//! those pass and the declared media type is accepted.

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use axum::http::HeaderMap;
use chrono::Utc;
use std::time::Instant;
use tempfile::TempDir;
use tubely_core::models::{StorageReference, Video, VideoResponse};
use tubely_core::AppError;
use tubely_storage::AssetKey;
use uuid::Uuid;

use super::multipart::{read_thumbnail, spool_video};
use super::types::{UploadFailure, UploadKind, UploadStage};
use crate::auth::{parse_bearer_token, validate_token};
use crate::services::UrlResolver;
use crate::state::AppState;

const NOT_OWNER: &str = "Not authorized to modify this video";
const SCRATCH_PREFIX: &str = "tubely-upload-";
const SCRATCH_FILE_NAME: &str = "tubely-upload.mp4";
const STORED_VIDEO_TYPE: &str = "video/mp4";

/// The body is only inspected after the entry checks, so a non-multipart body is reported here
/// rather than by the extractor.
fn not_multipart(rejection: MultipartRejection) -> AppError {
    AppError::InvalidInput(format!(
        "Expected a multipart/form-data body: {}",
        rejection.body_text()
    ))
}

/// Tracks where an upload is so a failure can be reported with full context.
struct UploadContext {
    kind: UploadKind,
    stage: UploadStage,
    video_id: Option<Uuid>,
    user_id: Option<Uuid>,
    started: Instant,
}

impl UploadContext {
    fn new(kind: UploadKind) -> Self {
        UploadContext {
            kind,
            stage: UploadStage::Received,
            video_id: None,
            user_id: None,
            started: Instant::now(),
        }
    }

    fn enter(&mut self, stage: UploadStage) {
        self.stage = stage;
        tracing::trace!(kind = %self.kind, stage = %stage, "Upload stage");
    }

    fn fail(&self, error: impl Into<AppError>) -> UploadFailure {
        UploadFailure {
            kind: self.kind,
            stage: self.stage,
            video_id: self.video_id,
            user_id: self.user_id,
            error: error.into(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Runs thumbnail and video uploads against the shared application state.
pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Attach a thumbnail image to a video the caller owns.
    pub async fn upload_thumbnail(
        &self,
        raw_video_id: &str,
        headers: &HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<VideoResponse, UploadFailure> {
        let mut ctx = UploadContext::new(UploadKind::Thumbnail);
        let mut video = self.authorize(&mut ctx, raw_video_id, headers).await?;

        ctx.enter(UploadStage::Buffered);
        let mut multipart = multipart.map_err(|r| ctx.fail(not_multipart(r)))?;
        let file = read_thumbnail(&mut multipart, self.state.config.max_thumbnail_size_bytes())
            .await
            .map_err(|e| ctx.fail(e))?;
        let size_bytes = file.data.len() as u64;

        ctx.enter(UploadStage::Stored);
        let key = AssetKey::thumbnail(&file.media_type).map_err(|e| ctx.fail(e))?;
        let reference = self
            .state
            .thumbnail_storage
            .write(key.as_str(), &file.media_type, file.data)
            .await
            .map_err(|e| ctx.fail(e))?;

        video.thumbnail = Some(reference);
        self.persist_and_respond(&mut ctx, video, &key, size_bytes)
            .await
    }

    /// Probe, remux and store an mp4 for a video the caller owns.
    ///
    /// The upload and the remuxed copy live in a per-request scratch directory that is removed
    /// when this returns, whether it succeeds, fails, or the client goes away.
    pub async fn upload_video(
        &self,
        raw_video_id: &str,
        headers: &HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<VideoResponse, UploadFailure> {
        let mut ctx = UploadContext::new(UploadKind::Video);
        let mut video = self.authorize(&mut ctx, raw_video_id, headers).await?;

        ctx.enter(UploadStage::Buffered);
        let mut multipart = multipart.map_err(|r| ctx.fail(not_multipart(r)))?;
        let scratch = self.scratch_dir().await.map_err(|e| ctx.fail(e))?;
        let upload_path = scratch.path().join(SCRATCH_FILE_NAME);
        let file = spool_video(&mut multipart, &upload_path)
            .await
            .map_err(|e| ctx.fail(e))?;

        tracing::debug!(
            video_id = %video.id,
            media_type = %file.media_type,
            size_bytes = file.size_bytes,
            "Video spooled to scratch file"
        );

        ctx.enter(UploadStage::Probed);
        let report = self
            .state
            .inspector
            .probe(&upload_path)
            .await
            .map_err(|e| ctx.fail(e))?;
        let orientation = report.orientation();

        ctx.enter(UploadStage::Normalized);
        let normalized = self
            .state
            .remuxer
            .faststart(&upload_path)
            .await
            .map_err(|e| ctx.fail(e))?;

        ctx.enter(UploadStage::Stored);
        let key = AssetKey::video(orientation);
        let reference = self
            .state
            .video_storage
            .write_file(key.as_str(), STORED_VIDEO_TYPE, &normalized)
            .await
            .map_err(|e| ctx.fail(e))?;

        video.video = Some(reference);
        let response = self
            .persist_and_respond(&mut ctx, video, &key, file.size_bytes)
            .await;

        drop(scratch);
        response
    }

    /// Steps shared by both uploads up to and including the ownership check.
    async fn authorize(
        &self,
        ctx: &mut UploadContext,
        raw_video_id: &str,
        headers: &HeaderMap,
    ) -> Result<Video, UploadFailure> {
        let video_id = Uuid::parse_str(raw_video_id)
            .map_err(|_| ctx.fail(AppError::InvalidInput("Invalid video ID".to_string())))?;
        ctx.video_id = Some(video_id);

        ctx.enter(UploadStage::Authorized);
        let token = parse_bearer_token(headers).map_err(|e| ctx.fail(e))?;
        let user_id =
            validate_token(token, self.state.config.jwt_secret()).map_err(|e| ctx.fail(e))?;
        ctx.user_id = Some(user_id);

        let video = self
            .state
            .videos
            .get_video(video_id)
            .await
            .map_err(|e| ctx.fail(e))?
            .ok_or_else(|| ctx.fail(AppError::UnknownVideo(video_id)))?;

        if !video.is_owned_by(user_id) {
            return Err(ctx.fail(AppError::Unauthorized(NOT_OWNER.to_string())));
        }

        Ok(video)
    }

    /// Write the updated record, then resolve it for the response.
    async fn persist_and_respond(
        &self,
        ctx: &mut UploadContext,
        mut video: Video,
        key: &AssetKey,
        size_bytes: u64,
    ) -> Result<VideoResponse, UploadFailure> {
        ctx.enter(UploadStage::RecordUpdated);
        video.updated_at = Utc::now();
        if let Err(e) = self.state.videos.update_video(&video).await {
            let stored = match ctx.kind {
                UploadKind::Thumbnail => video.thumbnail.as_ref(),
                UploadKind::Video => video.video.as_ref(),
            };
            tracing::error!(
                video_id = %video.id,
                user_id = %video.user_id,
                key = %key,
                reference = %stored.map(StorageReference::describe).unwrap_or_default(),
                error = %e,
                "Record update failed after storage write, stored asset is orphaned"
            );
            return Err(ctx.fail(AppError::Database(e.to_string())));
        }

        ctx.enter(UploadStage::Responded);
        let response = UrlResolver::new(self.state)
            .to_response(video)
            .await
            .map_err(|e| ctx.fail(e))?;

        tracing::info!(
            kind = %ctx.kind,
            video_id = %response.id,
            user_id = %response.user_id,
            key = %key,
            size_bytes,
            duration_ms = ctx.elapsed_ms(),
            "Upload completed"
        );

        Ok(response)
    }

    async fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        match &self.state.config.media.upload_temp_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }
}
