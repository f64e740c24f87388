//! Spawning external tools.

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};
use crate::limiter::ToolLimiter;

/// Reject tool paths containing shell metacharacters or traversal.
pub(crate) fn validate_tool_path(path: &str) -> ProcessingResult<()> {
    if path.is_empty()
        || path.contains("..")
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }
    Ok(())
}

/// Run `program` with an argument vector once a limiter slot is free.
///
/// The child is killed if the returned future is dropped.
pub(crate) async fn run_tool<I, S>(
    limiter: &ToolLimiter,
    tool: &str,
    program: &str,
    args: I,
) -> ProcessingResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let _permit = limiter.acquire().await?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProcessingError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProcessingError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
