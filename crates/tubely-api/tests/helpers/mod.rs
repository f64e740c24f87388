//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: in-memory video store, local storage in a temp dir, and canned
//! media tools in place of ffprobe/ffmpeg.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::models::Video;
use tubely_core::{Config, StorageSlot};
use tubely_db::{InMemoryVideoStore, VideoStore};
use tubely_processing::test_helpers::{CannedInspector, CopyRemuxer};
use tubely_processing::{MediaInspector, MediaRemuxer};
use tubely_storage::{create_storage, Storage};
use uuid::Uuid;

pub const TEST_ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// Test application: server, state, and the temp dirs it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub assets: TempDir,
    pub scratch: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a draft video owned by `owner`.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::draft(owner, "Boots".to_string(), Some("A pair of boots".to_string()));
        self.state
            .videos
            .create_video(&video)
            .await
            .expect("seed video");
        video
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.state
            .videos
            .get_video(id)
            .await
            .expect("get video")
            .expect("video exists")
    }

    /// Relative paths of every file under the assets root.
    pub fn asset_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(self.assets.path(), self.assets.path(), &mut files);
        files.sort();
        files
    }

    /// Number of entries left in the upload scratch root.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Builder for [`TestApp`] with swappable collaborators.
pub struct TestAppBuilder {
    vars: HashMap<String, String>,
    videos: Option<Arc<dyn VideoStore>>,
    inspector: Arc<dyn MediaInspector>,
    remuxer: Arc<dyn MediaRemuxer>,
    thumbnail_storage: Option<Arc<dyn Storage>>,
    video_storage: Option<Arc<dyn Storage>>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert("JWT_SECRET".to_string(), auth::TEST_JWT_SECRET.to_string());
        vars.insert("MAX_THUMBNAIL_SIZE_MB".to_string(), "1".to_string());
        vars.insert("ASSETS_BASE_URL".to_string(), TEST_ASSETS_BASE_URL.to_string());
        Self {
            vars,
            videos: None,
            inspector: Arc::new(CannedInspector::landscape()),
            remuxer: Arc::new(CopyRemuxer),
            thumbnail_storage: None,
            video_storage: None,
        }
    }

    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn videos(mut self, videos: Arc<dyn VideoStore>) -> Self {
        self.videos = Some(videos);
        self
    }

    pub fn inspector(mut self, inspector: Arc<dyn MediaInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    pub fn remuxer(mut self, remuxer: Arc<dyn MediaRemuxer>) -> Self {
        self.remuxer = remuxer;
        self
    }

    pub fn thumbnail_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.thumbnail_storage = Some(storage);
        self
    }

    pub fn video_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.video_storage = Some(storage);
        self
    }

    pub async fn build(self) -> TestApp {
        let assets = tempfile::tempdir().expect("assets dir");
        let scratch = tempfile::tempdir().expect("scratch dir");

        let mut vars = self.vars;
        vars.insert("ASSETS_ROOT".to_string(), assets.path().display().to_string());
        vars.insert(
            "UPLOAD_TEMP_DIR".to_string(),
            scratch.path().display().to_string(),
        );

        let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("test config");
        config.validate().expect("valid test config");

        let thumbnail_storage = match self.thumbnail_storage {
            Some(storage) => storage,
            None => create_storage(&config, StorageSlot::Thumbnail)
                .await
                .expect("thumbnail storage"),
        };
        let video_storage = match self.video_storage {
            Some(storage) => storage,
            None => create_storage(&config, StorageSlot::Video)
                .await
                .expect("video storage"),
        };

        let state = Arc::new(AppState {
            config: Arc::new(config),
            videos: self
                .videos
                .unwrap_or_else(|| Arc::new(InMemoryVideoStore::new())),
            thumbnail_storage,
            video_storage,
            inspector: self.inspector,
            remuxer: self.remuxer,
        });

        let router = routes::setup_routes(&state.config, state.clone()).expect("routes");
        let server = TestServer::new(router).expect("test server");

        TestApp {
            server,
            state,
            assets,
            scratch,
        }
    }
}

/// Default app: local storage for both slots, landscape probe, copy remux.
pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}
