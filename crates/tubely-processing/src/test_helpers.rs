//! In-process stand-ins for ffprobe and ffmpeg.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ProcessingError, ProcessingResult};
use crate::probe::{MediaInspector, ProbeReport};
use crate::remux::{processing_path, MediaRemuxer};

enum Canned {
    Report(ProbeReport),
    NoVideoStream,
    ToolFailed,
}

/// Returns a fixed probe result and records which paths were probed.
pub struct CannedInspector {
    canned: Canned,
    probed: Mutex<Vec<PathBuf>>,
}

impl CannedInspector {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self::new(Canned::Report(ProbeReport {
            width,
            height,
            codec_name: Some("h264".to_string()),
            duration: Some(10.0),
        }))
    }

    pub fn landscape() -> Self {
        Self::with_dimensions(1920, 1080)
    }

    pub fn portrait() -> Self {
        Self::with_dimensions(1080, 1920)
    }

    pub fn no_video_stream() -> Self {
        Self::new(Canned::NoVideoStream)
    }

    pub fn failing() -> Self {
        Self::new(Canned::ToolFailed)
    }

    fn new(canned: Canned) -> Self {
        CannedInspector {
            canned,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MediaInspector for CannedInspector {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeReport> {
        if let Ok(mut probed) = self.probed.lock() {
            probed.push(path.to_path_buf());
        }
        match &self.canned {
            Canned::Report(report) => Ok(report.clone()),
            Canned::NoVideoStream => Err(ProcessingError::NoVideoStream),
            Canned::ToolFailed => Err(ProcessingError::ToolFailed {
                tool: "ffprobe".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            }),
        }
    }
}

/// Copies the input to `<input>.processing` unchanged.
#[derive(Default)]
pub struct CopyRemuxer;

#[async_trait]
impl MediaRemuxer for CopyRemuxer {
    async fn faststart(&self, input: &Path) -> ProcessingResult<PathBuf> {
        let output = processing_path(input);
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

/// Always fails like ffmpeg rejecting a corrupt file. Records the scratch paths it saw.
#[derive(Default)]
pub struct FailingRemuxer {
    inputs: Mutex<Vec<PathBuf>>,
}

impl FailingRemuxer {
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs
            .lock()
            .map(|inputs| inputs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MediaRemuxer for FailingRemuxer {
    async fn faststart(&self, input: &Path) -> ProcessingResult<PathBuf> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.to_path_buf());
        }
        Err(ProcessingError::ToolFailed {
            tool: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        })
    }
}
