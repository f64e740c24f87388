use std::path::PathBuf;
use thiserror::Error;
use tubely_core::AppError;

/// Media tool errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Unparseable probe output: {0}")]
    MalformedOutput(String),

    #[error("Input has no video stream")]
    NoVideoStream,

    #[error("Tool reported success but produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("Media tool limiter is closed")]
    LimiterClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        AppError::Processing(err.to_string())
    }
}
