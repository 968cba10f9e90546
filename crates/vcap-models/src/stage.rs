//! Pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a job in the caption pipeline.
///
/// `Received → Downloading → Captioning → Transcoding → Uploading → Completed`;
/// a fatal stage moves the job to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Received,
    Downloading,
    Captioning,
    Transcoding,
    Uploading,
    Completed,
    Failed,
}

impl JobStage {
    /// Whether a failure in this stage aborts the job.
    ///
    /// Captioning degrades to a default caption instead.
    pub fn is_fatal_on_error(&self) -> bool {
        matches!(
            self,
            JobStage::Downloading | JobStage::Transcoding | JobStage::Uploading
        )
    }

    /// Whether the job is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Received => "received",
            JobStage::Downloading => "downloading",
            JobStage::Captioning => "captioning",
            JobStage::Transcoding => "transcoding",
            JobStage::Uploading => "uploading",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
