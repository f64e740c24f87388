//! Video stream inspection with ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use tubely_core::models::Orientation;

use crate::error::{ProcessingError, ProcessingResult};
use crate::limiter::ToolLimiter;
use crate::tool::{run_tool, validate_tool_path};

/// Facts about the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub width: u32,
    pub height: u32,
    pub codec_name: Option<String>,
    /// Container duration in seconds.
    pub duration: Option<f64>,
}

impl ProbeReport {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_dimensions(self.width, self.height)
    }
}

#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeReport>;
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    codec_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
///
/// The first stream tagged `codec_type == "video"` wins. Output without any
/// `codec_type` tags falls back to the first stream.
pub fn parse_ffprobe_output(stdout: &[u8]) -> ProcessingResult<ProbeReport> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::MalformedOutput(e.to_string()))?;

    let untagged = output.streams.iter().all(|s| s.codec_type.is_none());
    let stream = if untagged {
        output.streams.first()
    } else {
        output
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    }
    .ok_or(ProcessingError::NoVideoStream)?;

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok());

    Ok(ProbeReport {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        codec_name: stream.codec_name.clone(),
        duration,
    })
}

/// [`MediaInspector`] backed by the `ffprobe` binary.
#[derive(Clone, Debug)]
pub struct FfprobeInspector {
    ffprobe_path: String,
    limiter: ToolLimiter,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String, limiter: ToolLimiter) -> ProcessingResult<Self> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self {
            ffprobe_path,
            limiter,
        })
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeReport> {
        let start = std::time::Instant::now();

        let output = run_tool(
            &self.limiter,
            "ffprobe",
            &self.ffprobe_path,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-print_format"),
                OsStr::new("json"),
                OsStr::new("-show_format"),
                OsStr::new("-show_streams"),
                path.as_os_str(),
            ],
        )
        .await?;

        let report = parse_ffprobe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            width = report.width,
            height = report.height,
            codec = report.codec_name.as_deref().unwrap_or("unknown"),
            orientation = %report.orientation(),
            "Video probe completed"
        );

        Ok(report)
    }
}
