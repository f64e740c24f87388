use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tubely_core::models::{CreateVideoRequest, Video, VideoResponse};
use validator::Validate;

/// Create a draft video owned by the caller. Assets are attached later through the upload
/// endpoints.
#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Draft created", body = VideoResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = %auth.user_id))]
pub async fn create_video(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(tubely_core::AppError::from)?;

    let description = request.description.filter(|d| !d.trim().is_empty());
    let video = Video::draft(auth.user_id, request.title, description);
    state.videos.create_video(&video).await?;

    tracing::info!(video_id = %video.id, "Draft video created");

    Ok((StatusCode::CREATED, Json(VideoResponse::from(video))))
}
