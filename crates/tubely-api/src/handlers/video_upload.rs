use crate::error::ErrorResponse;
use crate::services::upload::UploadFailure;
use crate::services::UploadService;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::models::VideoResponse;

/// Upload an mp4, remux it for fast start and attach it to the video.
///
/// The stored key is prefixed with the probed orientation.
#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "uploads",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `video`: video/mp4"),
    responses(
        (status = 200, description = "Video stored", body = VideoResponse),
        (status = 400, description = "Invalid ID, unknown video, missing field or unsupported type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token, or not the owner", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the body limit", body = ErrorResponse),
        (status = 500, description = "Probe, remux, storage or database failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, UploadFailure> {
    let video = UploadService::new(&state)
        .upload_video(&video_id, &headers, multipart)
        .await?;
    Ok(Json(video))
}
