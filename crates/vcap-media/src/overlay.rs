//! External overlay script.
//!
//! The compositing step is a shell script treated as a black box. Its
//! contract is five positional arguments:
//!
//! ```text
//! <script> <input> <output> <narration|""> <subtitles|""> <caption>
//! ```
//!
//! Exit code zero means `<output>` holds the finished video.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{stderr_tail, MediaError, MediaResult};

/// Arguments for one overlay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Narration audio to mix in
    pub narration: Option<PathBuf>,
    /// Subtitle file to burn in
    pub subtitles: Option<PathBuf>,
    /// Caption text drawn over the video
    pub caption: String,
}

impl TranscodeRequest {
    /// Request without narration or subtitles.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            narration: None,
            subtitles: None,
            caption: caption.into(),
        }
    }

    /// Positional arguments in script order. Absent artifacts are passed as
    /// empty strings.
    pub fn to_args(&self) -> Vec<OsString> {
        let optional = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.as_os_str().to_os_string())
                .unwrap_or_default()
        };

        vec![
            self.input.as_os_str().to_os_string(),
            self.output.as_os_str().to_os_string(),
            optional(&self.narration),
            optional(&self.subtitles),
            OsString::from(&self.caption),
        ]
    }
}

/// Burns a caption (and optional narration/subtitles) into a video.
#[async_trait]
pub trait TranscodeService: Send + Sync {
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<()>;
}

/// Runs the external overlay script.
#[derive(Debug, Clone)]
pub struct OverlayScript {
    script: PathBuf,
}

impl OverlayScript {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

#[async_trait]
impl TranscodeService for OverlayScript {
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<()> {
        if !self.script.exists() {
            return Err(MediaError::ScriptNotFound(self.script.clone()));
        }

        debug!(
            "Running overlay script {} on {}",
            self.script.display(),
            request.input.display()
        );

        let output = Command::new(&self.script)
            .args(request.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::script_failed(
                output.status.code(),
                stderr_tail(&output.stderr),
            ));
        }

        info!("Overlay script finished: {}", request.output.display());
        Ok(())
    }
}
