//! Worker error types.

use thiserror::Error;

use vcap_models::JobStage;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Download failed: {0}")]
    Download(#[source] vcap_storage::StorageError),

    #[error("Transcode failed: {0}")]
    Transcode(#[from] vcap_media::MediaError),

    #[error("Upload failed: {0}")]
    Upload(#[source] vcap_storage::StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Pipeline stage that failed, for fatal stage errors.
    pub fn stage(&self) -> Option<JobStage> {
        match self {
            WorkerError::Download(_) => Some(JobStage::Downloading),
            WorkerError::Transcode(_) => Some(JobStage::Transcoding),
            WorkerError::Upload(_) => Some(JobStage::Uploading),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcap_media::MediaError;
    use vcap_storage::StorageError;

    #[test]
    fn test_stage_tags() {
        let download = WorkerError::Download(StorageError::not_found("in/a.mp4"));
        assert_eq!(download.stage(), Some(JobStage::Downloading));

        let transcode = WorkerError::from(MediaError::script_failed(Some(1), "boom"));
        assert_eq!(transcode.stage(), Some(JobStage::Transcoding));

        let upload = WorkerError::Upload(StorageError::upload_failed("denied"));
        assert_eq!(upload.stage(), Some(JobStage::Uploading));

        assert_eq!(WorkerError::config_error("x").stage(), None);
    }

    #[test]
    fn test_stage_errors_are_fatal() {
        for err in [
            WorkerError::Download(StorageError::not_found("k")),
            WorkerError::Upload(StorageError::upload_failed("k")),
        ] {
            assert!(err.stage().is_some_and(|s| s.is_fatal_on_error()));
        }
    }
}
