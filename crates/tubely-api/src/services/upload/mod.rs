//! Upload-and-publish pipeline for thumbnails and videos

mod multipart;
mod service;
mod types;

pub use service::UploadService;
pub use types::{UploadFailure, UploadKind, UploadStage};
