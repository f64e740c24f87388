//! Data models for the application

mod media;
mod storage;
mod video;

pub use media::*;
pub use storage::*;
pub use video::*;
