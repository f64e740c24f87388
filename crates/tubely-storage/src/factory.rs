use crate::InlineStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::{Config, StorageSlot};

/// Create the storage backend configured for one asset slot
pub async fn create_storage(config: &Config, slot: StorageSlot) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.backend_for(slot);
    let storage = &config.storage;

    tracing::debug!(slot = %slot, backend = %backend, "Creating storage backend");

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = storage
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = storage.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let credentials = storage
                .aws_access_key_id
                .clone()
                .zip(storage.aws_secret_access_key.clone());

            let s3 = S3Storage::new(
                bucket,
                region,
                storage.s3_endpoint.clone(),
                credentials,
                std::time::Duration::from_secs(storage.presigned_url_expiry_secs),
            )
            .await?;
            Ok(Arc::new(s3))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let local =
                LocalStorage::new(storage.assets_root.clone(), storage.assets_base_url.clone())
                    .await?;
            Ok(Arc::new(local))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Inline => match slot {
            StorageSlot::Thumbnail => Ok(Arc::new(InlineStorage::new(
                config.max_thumbnail_size_bytes() as u64,
            ))),
            StorageSlot::Video => Err(StorageError::ConfigError(
                "Inline storage is only supported for thumbnails".to_string(),
            )),
        },
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(root: &std::path::Path, vars: &[(&str, &str)]) -> Config {
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert("ASSETS_ROOT".into(), root.display().to_string());
        Config::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn creates_backend_per_slot() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), &[("THUMBNAIL_STORAGE", "inline")]);

        let thumbnails = create_storage(&config, StorageSlot::Thumbnail).await.unwrap();
        let videos = create_storage(&config, StorageSlot::Video).await.unwrap();

        assert_eq!(thumbnails.backend_type(), StorageBackend::Inline);
        assert_eq!(videos.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn inline_video_slot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), &[("VIDEO_STORAGE", "inline")]);

        let result = create_storage(&config, StorageSlot::Video).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
