//! Multipart extraction for upload requests
//!
//! The file field must appear exactly once and its declared media type is checked before
//! any of its bytes are read. Other fields are skipped.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::BytesMut;
use mime::Mime;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tubely_core::{AppError, AppResult};

use super::types::{BufferedFile, SpooledFile, UploadKind};

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload limit".to_string())
    } else {
        AppError::InvalidInput(format!("Malformed multipart body: {}", err.body_text()))
    }
}

fn duplicate_field(kind: UploadKind) -> AppError {
    AppError::InvalidInput(format!(
        "Multipart field `{}` must appear exactly once",
        kind.field_name()
    ))
}

fn missing_field(kind: UploadKind) -> AppError {
    AppError::InvalidInput(format!("Missing multipart field `{}`", kind.field_name()))
}

/// Parse the field's declared Content-Type and check its essence against the accepted set.
fn declared_media_type(field: &Field<'_>, kind: UploadKind) -> AppResult<String> {
    let declared = field.content_type().ok_or_else(|| {
        AppError::UnsupportedMediaType(format!(
            "Field `{}` has no Content-Type",
            kind.field_name()
        ))
    })?;

    let mime: Mime = declared
        .parse()
        .map_err(|_| AppError::UnsupportedMediaType(format!("Invalid Content-Type: {}", declared)))?;

    let accepted = kind.accepted_media_types();
    let essence = mime.essence_str();
    if !accepted.contains(&essence) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Unsupported media type {}, expected one of: {}",
            essence,
            accepted.join(", ")
        )));
    }

    Ok(essence.to_string())
}

/// Buffer the thumbnail field in memory, failing with 413 once `max_bytes` is exceeded.
pub(super) async fn read_thumbnail(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> AppResult<BufferedFile> {
    let kind = UploadKind::Thumbnail;
    let mut found: Option<BufferedFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(kind.field_name()) {
            continue;
        }
        if found.is_some() {
            return Err(duplicate_field(kind));
        }

        let media_type = declared_media_type(&field, kind)?;

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "Thumbnail exceeds max size of {} MB",
                    max_bytes / 1024 / 1024
                )));
            }
            data.extend_from_slice(&chunk);
        }

        found = Some(BufferedFile {
            media_type,
            data: data.freeze(),
        });
    }

    found.ok_or_else(|| missing_field(kind))
}

/// Stream the video field to `dest` chunk by chunk. The transport body limit bounds its size.
pub(super) async fn spool_video(multipart: &mut Multipart, dest: &Path) -> AppResult<SpooledFile> {
    let kind = UploadKind::Video;
    let mut found: Option<SpooledFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(kind.field_name()) {
            continue;
        }
        if found.is_some() {
            return Err(duplicate_field(kind));
        }

        let media_type = declared_media_type(&field, kind)?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
            size_bytes += chunk.len() as u64;
        }
        file.flush().await?;

        found = Some(SpooledFile {
            media_type,
            size_bytes,
        });
    }

    found.ok_or_else(|| missing_field(kind))
}
