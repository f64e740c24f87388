use crate::traits::{resolve_public, validate_key, Storage, StorageError, StorageResult};
use crate::{StorageBackend, StorageReference};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Produces time-limited GET URLs for private objects.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    async fn signed_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;
}

#[async_trait]
impl UrlSigner for AmazonS3 {
    async fn signed_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = ObjectPath::from(key);
        let url = self
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        Ok(url.to_string())
    }
}

/// S3 storage implementation
///
/// Objects are private. Writes return a bucket/key reference and reads sign a fresh URL.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn UrlSigner>,
    bucket: String,
    presign_expiry: Duration,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Explicit access key pair; the environment chain is used otherwise
    /// * `presign_expiry` - Lifetime of URLs produced by `resolve`
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<(String, String)>,
        presign_expiry: Duration,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        if let Some((access_key_id, secret_access_key)) = credentials {
            builder = builder
                .with_access_key_id(access_key_id)
                .with_secret_access_key(secret_access_key);
        }

        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        Ok(Self::with_parts(store.clone(), store, bucket, presign_expiry))
    }

    /// Assemble from an existing object store and signer.
    pub fn with_parts(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn UrlSigner>,
        bucket: String,
        presign_expiry: Duration,
    ) -> Self {
        S3Storage {
            store,
            signer,
            bucket,
            presign_expiry,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn content_type_attributes(content_type: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn write(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StorageReference> {
        validate_key(key)?;
        let size = data.len() as u64;
        let location = ObjectPath::from(key);
        let opts = PutOptions {
            attributes: Self::content_type_attributes(content_type),
            ..Default::default()
        };

        let start = std::time::Instant::now();

        self.store
            .put_opts(&location, PutPayload::from(data), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StorageReference::bucket_key(self.bucket.clone(), key))
    }

    async fn write_file(
        &self,
        key: &str,
        content_type: &str,
        path: &Path,
    ) -> StorageResult<StorageReference> {
        validate_key(key)?;
        let location = ObjectPath::from(key);
        let start = std::time::Instant::now();

        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut writer = BufWriter::new(Arc::clone(&self.store), location)
            .with_attributes(Self::content_type_attributes(content_type));

        let copied = match tokio::io::copy(&mut file, &mut writer).await {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %key,
                        "Failed to abort S3 multipart upload"
                    );
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        writer.shutdown().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = copied,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 stream upload failed to complete"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 stream upload successful"
        );

        Ok(StorageReference::bucket_key(self.bucket.clone(), key))
    }

    async fn resolve(&self, reference: &StorageReference) -> StorageResult<String> {
        match reference {
            StorageReference::BucketKey { bucket, key } => {
                if bucket != &self.bucket {
                    return Err(StorageError::InvalidKey(format!(
                        "Reference names bucket {} but storage is configured for {}",
                        bucket, self.bucket
                    )));
                }
                validate_key(key)?;
                self.signer.signed_get_url(key, self.presign_expiry).await
            }
            other => resolve_public(other, StorageBackend::S3),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
