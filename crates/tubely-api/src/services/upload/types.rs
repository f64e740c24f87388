//! Types used by the upload service

use crate::error::render_error;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::models::{THUMBNAIL_MEDIA_TYPES, VIDEO_MEDIA_TYPES};
use tubely_core::{AppError, ErrorMetadata, LogLevel, StorageSlot};
use uuid::Uuid;

/// Which asset slot an upload fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Thumbnail,
    Video,
}

impl UploadKind {
    /// Multipart field that carries the file
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "thumbnail",
            UploadKind::Video => "video",
        }
    }

    pub fn accepted_media_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Thumbnail => THUMBNAIL_MEDIA_TYPES,
            UploadKind::Video => VIDEO_MEDIA_TYPES,
        }
    }

    pub fn slot(&self) -> StorageSlot {
        match self {
            UploadKind::Thumbnail => StorageSlot::Thumbnail,
            UploadKind::Video => StorageSlot::Video,
        }
    }
}

impl Display for UploadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.field_name())
    }
}

/// Pipeline stage an upload is working on. Thumbnails skip `Probed` and `Normalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Authorized,
    Buffered,
    Probed,
    Normalized,
    Stored,
    RecordUpdated,
    Responded,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::Authorized => "authorized",
            UploadStage::Buffered => "buffered",
            UploadStage::Probed => "probed",
            UploadStage::Normalized => "normalized",
            UploadStage::Stored => "stored",
            UploadStage::RecordUpdated => "record_updated",
            UploadStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Thumbnail payload held in memory
pub(super) struct BufferedFile {
    pub media_type: String,
    pub data: Bytes,
}

/// Video payload written to the scratch directory
pub(super) struct SpooledFile {
    pub media_type: String,
    pub size_bytes: u64,
}

/// Terminal `Failed` state: the error plus where it happened.
///
/// Converting into a response logs the failure, so each failed upload is logged exactly once.
#[derive(Debug)]
pub struct UploadFailure {
    pub kind: UploadKind,
    pub stage: UploadStage,
    pub video_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub error: AppError,
}

impl UploadFailure {
    fn log(&self) {
        let video_id = self.video_id.map(|id| id.to_string());
        let user_id = self.user_id.map(|id| id.to_string());
        let error_type = self.error.error_type();
        macro_rules! emit {
            ($level:ident) => {
                tracing::$level!(
                    kind = %self.kind,
                    stage = %self.stage,
                    video_id = video_id.as_deref().unwrap_or("-"),
                    user_id = user_id.as_deref().unwrap_or("-"),
                    error = %self.error,
                    error_type,
                    "Upload failed"
                )
            };
        }
        match self.error.log_level() {
            LogLevel::Debug => emit!(debug),
            LogLevel::Warn => emit!(warn),
            LogLevel::Error => emit!(error),
        }
    }
}

impl IntoResponse for UploadFailure {
    fn into_response(self) -> Response {
        self.log();
        render_error(&self.error)
    }
}
