//! Video upload and record integration tests.
//!
//! Run with: `cargo test -p tubely-api --test videos_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::bearer;
use helpers::fixtures::{self, file_form, mp4_video_form};
use helpers::storage::{FailingStorage, MemoryObjectStorage, UpdateFailingStore, TEST_BUCKET};
use helpers::{setup_test_app, TestAppBuilder, TEST_ASSETS_BASE_URL};
use std::sync::Arc;
use tubely_core::models::{StorageReference, VideoResponse};
use tubely_processing::test_helpers::{CannedInspector, FailingRemuxer};
use uuid::Uuid;

#[tokio::test]
async fn test_landscape_upload_end_to_end() {
    let objects = MemoryObjectStorage::new();
    let app = TestAppBuilder::new()
        .video_storage(objects.storage.clone())
        .inspector(Arc::new(CannedInspector::with_dimensions(1920, 1080)))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let stored = app.stored_video(video.id).await;
    let key = match stored.video {
        Some(StorageReference::BucketKey { ref bucket, ref key }) => {
            assert_eq!(bucket, TEST_BUCKET);
            key.clone()
        }
        other => panic!("expected bucket/key reference, got {:?}", other),
    };
    assert!(key.starts_with("landscape/"), "key was {}", key);
    assert!(key.ends_with(".mp4"));

    // The response carries a signed URL, never the raw reference.
    let body: VideoResponse = response.json();
    let url = body.video_url.expect("video url");
    assert!(url.contains(&key));
    assert!(url.contains("X-Amz-Signature"));

    let object = objects.object(&key).await.expect("object stored");
    assert_eq!(object.as_ref(), fixtures::create_fake_mp4().as_slice());

    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_portrait_upload_to_local_storage_is_served() {
    let app = TestAppBuilder::new()
        .inspector(Arc::new(CannedInspector::portrait()))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: VideoResponse = response.json();
    let url = body.video_url.expect("video url");
    assert!(url.starts_with(&format!("{}/portrait/", TEST_ASSETS_BASE_URL)));

    let files = app.asset_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("portrait/"));

    let asset = app
        .client()
        .get(url.trim_start_matches("http://localhost:8091"))
        .await;
    assert_eq!(asset.status_code(), StatusCode::OK);
    assert_eq!(asset.as_bytes().len(), fixtures::create_fake_mp4().len());
}

#[tokio::test]
async fn test_square_video_uses_other_prefix() {
    let app = TestAppBuilder::new()
        .inspector(Arc::new(CannedInspector::with_dimensions(1080, 1080)))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.asset_files()[0].starts_with("other/"));
}

#[tokio::test]
async fn test_missing_scratch_root_is_recreated() {
    let app = setup_test_app().await;
    std::fs::remove_dir(app.scratch.path()).unwrap();
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.scratch.path().is_dir());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_remux_failure_is_500_and_scratch_is_removed() {
    let remuxer = Arc::new(FailingRemuxer::default());
    let app = TestAppBuilder::new().remuxer(remuxer.clone()).build().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MEDIA_PROCESSING_ERROR");

    let inputs = remuxer.inputs();
    assert_eq!(inputs.len(), 1);
    assert!(!inputs[0].exists());
    assert_eq!(app.scratch_entries(), 0);
    assert!(app.asset_files().is_empty());
    assert!(app.stored_video(video.id).await.video.is_none());
}

#[tokio::test]
async fn test_input_without_video_stream_is_rejected() {
    let app = TestAppBuilder::new()
        .inspector(Arc::new(CannedInspector::no_video_stream()))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.asset_files().is_empty());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_storage_failure_leaves_record_unmodified() {
    let app = TestAppBuilder::new()
        .video_storage(Arc::new(FailingStorage))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.stored_video(video.id).await, video);
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_record_update_failure_after_write_is_500() {
    let app = TestAppBuilder::new()
        .videos(Arc::new(UpdateFailingStore::default()))
        .build()
        .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DATABASE_ERROR");
    // The asset was written before the update failed and stays behind.
    assert_eq!(app.asset_files().len(), 1);
}

#[tokio::test]
async fn test_wrong_type_and_wrong_field_are_400() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let path = format!("/api/video_upload/{}", video.id);

    let quicktime = file_form("video", fixtures::create_fake_mp4(), "a.mov", "video/quicktime");
    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", bearer(owner))
        .multipart(quicktime)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let wrong_field = file_form("thumbnail", fixtures::create_fake_mp4(), "a.mp4", "video/mp4");
    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", bearer(owner))
        .multipart(wrong_field)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert!(app.asset_files().is_empty());
    assert_eq!(app.scratch_entries(), 0);
}

#[tokio::test]
async fn test_video_upload_by_non_owner_is_401() {
    let app = setup_test_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(mp4_video_form())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_bucket_key_is_signed_afresh_on_every_read() {
    let objects = MemoryObjectStorage::new();
    let app = TestAppBuilder::new()
        .video_storage(objects.storage.clone())
        .build()
        .await;
    let owner = Uuid::new_v4();
    let mut video = app.seed_video(owner).await;
    video.video = Some(StorageReference::bucket_key(TEST_BUCKET, "landscape/abc.mp4"));
    video.thumbnail = Some(StorageReference::url(format!(
        "{}/thumb.png",
        TEST_ASSETS_BASE_URL
    )));
    app.state.videos.update_video(&video).await.unwrap();

    let path = format!("/api/videos/{}", video.id);
    let first: VideoResponse = app.client().get(&path).await.json();
    let second: VideoResponse = app.client().get(&path).await.json();

    let first_url = first.video_url.unwrap();
    let second_url = second.video_url.unwrap();
    assert!(first_url.contains("landscape/abc.mp4"));
    assert!(second_url.contains("landscape/abc.mp4"));
    assert_ne!(first_url, second_url);
    assert_eq!(objects.signer.calls(), 2);

    // Direct URLs pass through untouched.
    assert_eq!(
        first.thumbnail_url.as_deref(),
        Some(format!("{}/thumb.png", TEST_ASSETS_BASE_URL).as_str())
    );

    // The stored record keeps the durable reference.
    assert_eq!(app.stored_video(video.id).await.video, video.video);
}

#[tokio::test]
async fn test_create_list_and_get_videos() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", bearer(owner))
        .json(&serde_json::json!({"title": "Boots", "description": "Waterproof"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: VideoResponse = response.json();
    assert_eq!(created.user_id, owner);
    assert_eq!(created.title, "Boots");
    assert!(created.video_url.is_none());

    app.seed_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .get("/api/videos")
        .add_header("Authorization", bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listed: Vec<VideoResponse> = response.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    // Single-record reads need no token.
    let response = app.client().get(&format!("/api/videos/{}", created.id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: VideoResponse = response.json();
    assert_eq!(fetched.description.as_deref(), Some("Waterproof"));
}

#[tokio::test]
async fn test_video_record_errors() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/videos").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.client().get("/api/videos/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .json(&serde_json::json!({"title": ""}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .post("/api/videos")
        .json(&serde_json::json!({"title": "No token"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["video_storage"], "local");

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/api/video_upload/{video_id}"].is_object());
}
