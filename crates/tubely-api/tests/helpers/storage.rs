//! Storage and store doubles for failure paths and the object-storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStoreExt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::models::{StorageReference, Video};
use tubely_db::{InMemoryVideoStore, StoreError, StoreResult, VideoStore};
use tubely_storage::{
    S3Storage, Storage, StorageBackend, StorageError, StorageResult, UrlSigner,
};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "tubely-test";

/// Signs by appending a counter, so two signatures for one key always differ.
#[derive(Default)]
pub struct CountingSigner {
    calls: AtomicUsize,
}

impl CountingSigner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrlSigner for CountingSigner {
    async fn signed_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!(
            "https://{}.s3.example.com/{}?X-Amz-Expires={}&X-Amz-Signature=sig{}",
            TEST_BUCKET,
            key,
            expires_in.as_secs(),
            n
        ))
    }
}

/// Object storage backed by `InMemory`, with handles to inspect what was written and signed.
pub struct MemoryObjectStorage {
    pub store: Arc<InMemory>,
    pub signer: Arc<CountingSigner>,
    pub storage: Arc<S3Storage>,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        let store = Arc::new(InMemory::new());
        let signer = Arc::new(CountingSigner::default());
        let storage = Arc::new(S3Storage::with_parts(
            store.clone(),
            signer.clone(),
            TEST_BUCKET.to_string(),
            Duration::from_secs(3600),
        ));
        Self {
            store,
            signer,
            storage,
        }
    }

    pub async fn object(&self, key: &str) -> Option<Bytes> {
        let result = self.store.get(&ObjectPath::from(key)).await.ok()?;
        result.bytes().await.ok()
    }
}

/// Every write fails like a throttled backend.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn write(
        &self,
        _key: &str,
        _content_type: &str,
        _data: Bytes,
    ) -> StorageResult<StorageReference> {
        Err(StorageError::UploadFailed("503 Slow Down".to_string()))
    }

    async fn write_file(
        &self,
        _key: &str,
        _content_type: &str,
        _path: &Path,
    ) -> StorageResult<StorageReference> {
        Err(StorageError::UploadFailed("503 Slow Down".to_string()))
    }

    async fn resolve(&self, reference: &StorageReference) -> StorageResult<String> {
        reference
            .client_url()
            .ok_or_else(|| StorageError::BackendError("cannot sign".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Reads work, updates fail as if the record vanished mid-request.
#[derive(Default)]
pub struct UpdateFailingStore {
    inner: InMemoryVideoStore,
}

#[async_trait]
impl VideoStore for UpdateFailingStore {
    async fn get_video(&self, id: Uuid) -> StoreResult<Option<Video>> {
        self.inner.get_video(id).await
    }

    async fn update_video(&self, video: &Video) -> StoreResult<()> {
        Err(StoreError::NotFound(video.id))
    }

    async fn create_video(&self, video: &Video) -> StoreResult<()> {
        self.inner.create_video(video).await
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Video>> {
        self.inner.list_videos_for_user(user_id).await
    }
}
