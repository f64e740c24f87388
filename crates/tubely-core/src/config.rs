//! Configuration module
//!
//! Configuration is read once at startup from the environment (after loading `.env`),
//! validated, and then shared read-only.

use std::env;
use std::path::PathBuf;

use crate::storage_types::{StorageBackend, StorageSlot};

// Common constants
const SERVER_PORT: u16 = 8091;
const DB_MAX_CONNECTIONS: u32 = 10;
const PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;
/// SigV4 presigned URLs cannot outlive seven days.
const MAX_PRESIGNED_URL_EXPIRY_SECS: u64 = 7 * 24 * 3600;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MAX_VIDEO_UPLOAD_GB: usize = 10;
const MAX_CONCURRENT_MEDIA_TOOLS: usize = 4;

/// Settings shared by every part of the server
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub environment: String,
}

/// Storage backends and their connection settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub thumbnail_backend: StorageBackend,
    pub video_backend: StorageBackend,
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, LocalStack)
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub presigned_url_expiry_secs: u64,
}

/// Upload limits and external media tools
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub max_thumbnail_size_bytes: usize,
    pub max_video_upload_bytes: usize,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub max_concurrent_media_tools: usize,
    pub upload_temp_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    /// `None` selects the in-memory metadata store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = var("PORT")
            .unwrap_or_else(|| SERVER_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(SERVER_PORT);

        let base = BaseConfig {
            server_port,
            cors_origins,
            jwt_secret: var("JWT_SECRET").unwrap_or_default(),
            environment,
        };

        let s3_bucket = var("S3_BUCKET");

        let thumbnail_backend = match var("THUMBNAIL_STORAGE") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };
        let video_backend = match var("VIDEO_STORAGE") {
            Some(value) => value.parse::<StorageBackend>()?,
            None if s3_bucket.is_some() => StorageBackend::S3,
            None => StorageBackend::Local,
        };

        let assets_base_url = var("ASSETS_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}/assets", server_port))
            .trim_end_matches('/')
            .to_string();

        let storage = StorageConfig {
            thumbnail_backend,
            video_backend,
            assets_root: PathBuf::from(var("ASSETS_ROOT").unwrap_or_else(|| "./assets".into())),
            assets_base_url,
            s3_bucket,
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            presigned_url_expiry_secs: var("PRESIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|| PRESIGNED_URL_EXPIRY_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(PRESIGNED_URL_EXPIRY_SECS),
        };

        let max_thumbnail_size_mb = var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        let max_video_upload_gb = var("MAX_VIDEO_UPLOAD_GB")
            .unwrap_or_else(|| MAX_VIDEO_UPLOAD_GB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_UPLOAD_GB);

        let media = MediaConfig {
            max_thumbnail_size_bytes: max_thumbnail_size_mb.saturating_mul(1024 * 1024),
            max_video_upload_bytes: max_video_upload_gb.saturating_mul(1024 * 1024 * 1024),
            ffprobe_path: var("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            max_concurrent_media_tools: var("MAX_CONCURRENT_MEDIA_TOOLS")
                .unwrap_or_else(|| MAX_CONCURRENT_MEDIA_TOOLS.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_CONCURRENT_MEDIA_TOOLS),
            upload_temp_dir: var("UPLOAD_TEMP_DIR").map(PathBuf::from),
        };

        Ok(Config {
            base,
            database_url: var("DATABASE_URL"),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| DB_MAX_CONNECTIONS.to_string())
                .parse::<u32>()
                .unwrap_or(DB_MAX_CONNECTIONS),
            storage,
            media,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.media.max_concurrent_media_tools == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_MEDIA_TOOLS must be at least 1"
            ));
        }

        let expiry = self.storage.presigned_url_expiry_secs;
        if expiry == 0 || expiry > MAX_PRESIGNED_URL_EXPIRY_SECS {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_EXPIRY_SECS must be between 1 and {}",
                MAX_PRESIGNED_URL_EXPIRY_SECS
            ));
        }

        if self.storage.video_backend == StorageBackend::Inline {
            return Err(anyhow::anyhow!(
                "VIDEO_STORAGE cannot be 'inline'; use 'local' or 's3'"
            ));
        }

        for slot in [StorageSlot::Thumbnail, StorageSlot::Video] {
            if self.backend_for(slot) == StorageBackend::S3 {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when {} storage uses the S3 backend",
                        slot
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.base.environment)
    }

    pub fn backend_for(&self, slot: StorageSlot) -> StorageBackend {
        match slot {
            StorageSlot::Thumbnail => self.storage.thumbnail_backend,
            StorageSlot::Video => self.storage.video_backend,
        }
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.media.max_thumbnail_size_bytes
    }

    pub fn max_video_upload_bytes(&self) -> usize {
        self.media.max_video_upload_bytes
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}
