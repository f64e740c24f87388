//! Storage reference model: where a video record's asset lives.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Reference to a stored asset, persisted as tagged JSON in the record.
///
/// A record slot holds exactly one variant. `BucketKey` references are private and must be
/// turned into a signed `Url` before they reach a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageReference {
    /// Publicly reachable URL.
    Url { url: String },
    /// Object in a private bucket.
    BucketKey { bucket: String, key: String },
    /// Bytes embedded in the record, base64 (standard alphabet) encoded.
    Inline { media_type: String, data: String },
}

impl StorageReference {
    pub fn url(url: impl Into<String>) -> Self {
        StorageReference::Url { url: url.into() }
    }

    pub fn bucket_key(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        StorageReference::BucketKey {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn inline(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        StorageReference::Inline {
            media_type: media_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// The storage key, if the reference names one.
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageReference::BucketKey { key, .. } => Some(key),
            _ => None,
        }
    }

    /// URL a client can fetch without further signing.
    ///
    /// Returns `None` for `BucketKey`, which needs a signer.
    pub fn client_url(&self) -> Option<String> {
        match self {
            StorageReference::Url { url } => Some(url.clone()),
            StorageReference::Inline { media_type, data } => {
                Some(format!("data:{};base64,{}", media_type, data))
            }
            StorageReference::BucketKey { .. } => None,
        }
    }

    /// Short description for logs. Never includes inline payloads.
    pub fn describe(&self) -> String {
        match self {
            StorageReference::Url { url } => format!("url:{}", url),
            StorageReference::BucketKey { bucket, key } => format!("{}/{}", bucket, key),
            StorageReference::Inline { media_type, data } => {
                format!("inline:{} ({} base64 chars)", media_type, data.len())
            }
        }
    }
}
