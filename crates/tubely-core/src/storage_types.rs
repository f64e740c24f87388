use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selected per slot (thumbnails, videos) from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
    /// Bytes embedded in the record as a `data:` URI. Thumbnails only.
    Inline,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "inline" => Ok(StorageBackend::Inline),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Inline => write!(f, "inline"),
        }
    }
}

/// Which asset slot of a video record a backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSlot {
    Thumbnail,
    Video,
}

impl Display for StorageSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageSlot::Thumbnail => write!(f, "thumbnail"),
            StorageSlot::Video => write!(f, "video"),
        }
    }
}
