//! Tubely Processing Library
//!
//! Wrappers around the external media tools used by the upload pipeline: `ffprobe` for
//! orientation detection and `ffmpeg` for fast-start remuxing. Both run as async child
//! processes behind a shared [`ToolLimiter`].

pub mod error;
pub mod limiter;
pub mod probe;
pub mod remux;
mod tool;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use error::ProcessingError;
pub use limiter::ToolLimiter;
pub use probe::{parse_ffprobe_output, FfprobeInspector, MediaInspector, ProbeReport};
pub use remux::{processing_path, FfmpegRemuxer, MediaRemuxer};
pub use tubely_core::models::Orientation;
