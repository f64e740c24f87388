//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Payload too large: {size} bytes exceeds {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::TooLarge { size, limit } => AppError::PayloadTooLarge(format!(
                "{} bytes exceeds max {} bytes",
                size, limit
            )),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Backends persist an asset under a key produced by [`crate::AssetKey`] and hand back the
/// [`StorageReference`] that gets written into the video record. References are turned into
/// client-fetchable URLs with [`Storage::resolve`] on every read.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store an in-memory payload under `key`.
    async fn write(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StorageReference>;

    /// Store the contents of a local file under `key` without buffering it in memory.
    async fn write_file(
        &self,
        key: &str,
        content_type: &str,
        path: &Path,
    ) -> StorageResult<StorageReference>;

    /// Produce a URL a client can fetch for `reference`.
    ///
    /// Private references are signed on every call.
    async fn resolve(&self, reference: &StorageReference) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape the storage root.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Resolution shared by every backend for self-describing references.
pub(crate) fn resolve_public(
    reference: &StorageReference,
    backend: StorageBackend,
) -> StorageResult<String> {
    reference.client_url().ok_or_else(|| {
        StorageError::ConfigError(format!(
            "{} storage cannot sign bucket/key references",
            backend
        ))
    })
}
