use crate::traits::{resolve_public, validate_key, Storage, StorageError, StorageResult};
use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem storage implementation
///
/// Files are served by the HTTP layer from `base_path`, so every write returns a direct URL.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Copy `reader` into a `.partial` sibling of `path` and rename it into place once synced.
    /// Nothing appears at `path` unless the whole object was written.
    async fn write_atomic<R>(&self, path: &Path, reader: &mut R) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.ensure_parent_dir(path).await?;

        let staging = staging_path(path);
        let result = match copy_and_sync(&staging, reader).await {
            Ok(bytes_written) => fs::rename(&staging, path)
                .await
                .map(|_| bytes_written)
                .map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to move {} into place: {}",
                        path.display(),
                        e
                    ))
                }),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = fs::remove_file(&staging).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %staging.display(),
                        error = %e,
                        "Failed to remove partial file"
                    );
                }
            }
        }

        result
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

async fn copy_and_sync<R>(staging: &Path, reader: &mut R) -> StorageResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = fs::File::create(staging).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to create file {}: {}", staging.display(), e))
    })?;

    let bytes_written = tokio::io::copy(reader, &mut file).await.map_err(|e| {
        StorageError::UploadFailed(format!(
            "Failed to write stream to file {}: {}",
            staging.display(),
            e
        ))
    })?;

    file.sync_all().await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to sync file {}: {}", staging.display(), e))
    })?;

    Ok(bytes_written)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn write(
        &self,
        key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<StorageReference> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let mut reader: &[u8] = &data;
        let size = self.write_atomic(&path, &mut reader).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(StorageReference::url(self.generate_url(key)))
    }

    async fn write_file(
        &self,
        key: &str,
        _content_type: &str,
        source: &Path,
    ) -> StorageResult<StorageReference> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let mut reader = fs::File::open(source).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to open {}: {}", source.display(), e))
        })?;

        let bytes_copied = self.write_atomic(&path, &mut reader).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage file write successful"
        );

        Ok(StorageReference::url(self.generate_url(key)))
    }

    async fn resolve(&self, reference: &StorageReference) -> StorageResult<String> {
        resolve_public(reference, StorageBackend::Local)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
