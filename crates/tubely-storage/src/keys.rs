//! Shared key generation for storage backends.
//!
//! Key format: thumbnails `{base64url}.{ext}`, videos `{orientation}/{hex}.mp4`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::models::{extension_for_media_type, Orientation, THUMBNAIL_MEDIA_TYPES};

use crate::{StorageError, StorageResult};

const KEY_ENTROPY_BYTES: usize = 32;

/// Unique name of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// Key for a thumbnail of the given (already validated) media type essence.
    pub fn thumbnail(media_type: &str) -> StorageResult<Self> {
        let ext = THUMBNAIL_MEDIA_TYPES
            .contains(&media_type)
            .then(|| extension_for_media_type(media_type))
            .flatten()
            .ok_or_else(|| {
                StorageError::InvalidKey(format!("No thumbnail extension for {}", media_type))
            })?;

        Ok(AssetKey(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(random_bytes()),
            ext
        )))
    }

    /// Key for a normalized mp4, grouped under its orientation.
    pub fn video(orientation: Orientation) -> Self {
        AssetKey(format!("{}/{}.mp4", orientation, hex::encode(random_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn random_bytes() -> [u8; KEY_ENTROPY_BYTES] {
    let mut bytes = [0u8; KEY_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}
