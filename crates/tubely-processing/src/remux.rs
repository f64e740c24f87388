//! Fast-start remuxing with ffmpeg.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, ProcessingResult};
use crate::limiter::ToolLimiter;
use crate::tool::{run_tool, validate_tool_path};

#[async_trait]
pub trait MediaRemuxer: Send + Sync {
    /// Rewrite `input` so its index precedes the media data. Returns the new file's path.
    async fn faststart(&self, input: &Path) -> ProcessingResult<PathBuf>;
}

/// Sibling output path: `<input>.processing`.
pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".processing");
    PathBuf::from(name)
}

/// [`MediaRemuxer`] backed by the `ffmpeg` binary. Streams are copied, never re-encoded.
#[derive(Clone, Debug)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    limiter: ToolLimiter,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: String, limiter: ToolLimiter) -> ProcessingResult<Self> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self {
            ffmpeg_path,
            limiter,
        })
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial remux output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove partial remux output"
        ),
    }
}

#[async_trait]
impl MediaRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn faststart(&self, input: &Path) -> ProcessingResult<PathBuf> {
        let start = std::time::Instant::now();
        let output = processing_path(input);

        let result = run_tool(
            &self.limiter,
            "ffmpeg",
            &self.ffmpeg_path,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-y"),
                OsStr::new("-i"),
                input.as_os_str(),
                OsStr::new("-c"),
                OsStr::new("copy"),
                OsStr::new("-movflags"),
                OsStr::new("faststart"),
                OsStr::new("-f"),
                OsStr::new("mp4"),
                output.as_os_str(),
            ],
        )
        .await;

        if let Err(e) = result {
            remove_partial(&output).await;
            return Err(e);
        }

        if !tokio::fs::try_exists(&output).await? {
            return Err(ProcessingError::MissingOutput(output));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            output = %output.display(),
            "Fast-start remux completed"
        );

        Ok(output)
    }
}
