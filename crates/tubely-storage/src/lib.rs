//! Tubely Storage Library
//!
//! This crate provides the storage abstraction for video assets and its backends:
//! local filesystem, S3-compatible object storage, and inline data URIs (thumbnails only).
//!
//! # Storage key format
//!
//! - **Thumbnails**: `{base64url}.{ext}`
//! - **Videos**: `{orientation}/{hex}.mp4`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod inline;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use inline::InlineStorage;
pub use keys::AssetKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Storage, UrlSigner};
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::models::StorageReference;
pub use tubely_core::StorageBackend;
