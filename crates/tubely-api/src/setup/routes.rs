//! Route table and HTTP layers

use crate::api_doc::openapi_json;
use crate::handlers::{
    health::health_check, thumbnail_upload::upload_thumbnail, video_create::create_video,
    video_get::get_video, video_get::list_videos, video_upload::upload_video,
};
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::Config;

/// Room for multipart boundaries and headers on top of the thumbnail itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    let thumbnail_body_limit = thumbnail_body_limit(config);
    let video_body_limit = config.max_video_upload_bytes();

    tracing::debug!(
        thumbnail_body_limit,
        video_body_limit,
        "Upload body limits configured"
    );

    let router = Router::new()
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(upload_thumbnail).layer(DefaultBodyLimit::max(thumbnail_body_limit)),
        )
        .route(
            "/api/video_upload/{video_id}",
            post(upload_video).layer(DefaultBodyLimit::max(video_body_limit)),
        )
        .route("/api/videos", get(list_videos).post(create_video))
        .route("/api/videos/{video_id}", get(get_video))
        .route("/api/openapi.json", get(openapi_json))
        .route("/health", get(health_check))
        .nest_service("/assets", ServeDir::new(&config.storage.assets_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn thumbnail_body_limit(config: &Config) -> usize {
    config
        .max_thumbnail_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid origin in CORS_ORIGINS")?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Ok(cors)
}
