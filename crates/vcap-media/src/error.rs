//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Overlay script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Overlay script failed with exit code {exit_code:?}: {stderr}")]
    ScriptFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Output file missing after run: {0}")]
    MissingOutput(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an overlay script failure error.
    pub fn script_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ScriptFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}

/// Keep the last few lines of a process' stderr for error messages.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 20;

    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}
