//! Inline "storage": thumbnails embedded in the record as base64.
//!
//! Nothing is written anywhere. Payloads grow the metadata row, so this backend is
//! limited to the thumbnail slot and capped at the thumbnail size limit.

use crate::traits::{resolve_public, Storage, StorageError, StorageResult};
use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct InlineStorage {
    max_bytes: u64,
}

impl InlineStorage {
    pub fn new(max_bytes: u64) -> Self {
        InlineStorage { max_bytes }
    }

    fn check_size(&self, size: u64) -> StorageResult<()> {
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for InlineStorage {
    async fn write(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StorageReference> {
        self.check_size(data.len() as u64)?;

        tracing::debug!(
            key = %key,
            size_bytes = data.len(),
            "Thumbnail stored inline"
        );

        Ok(StorageReference::inline(content_type, &data))
    }

    async fn write_file(
        &self,
        key: &str,
        content_type: &str,
        path: &Path,
    ) -> StorageResult<StorageReference> {
        let size = tokio::fs::metadata(path).await?.len();
        self.check_size(size)?;

        let data = tokio::fs::read(path).await?;
        self.write(key, content_type, Bytes::from(data)).await
    }

    async fn resolve(&self, reference: &StorageReference) -> StorageResult<String> {
        resolve_public(reference, StorageBackend::Inline)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Inline
    }
}
