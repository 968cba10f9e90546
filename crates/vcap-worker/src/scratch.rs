//! Per-job scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vcap_models::JobId;

/// Scratch space owned by one job.
///
/// Everything a job writes locally lives under one directory that is removed
/// when this value is closed or dropped, whatever the outcome.
#[derive(Debug)]
pub struct JobScratch {
    dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl JobScratch {
    /// Create a fresh directory under `work_dir`, creating `work_dir` if needed.
    pub async fn create(work_dir: &Path, job_id: &JobId) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(work_dir).await?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(work_dir)?;
        let input = dir.path().join("input.mp4");
        let output = dir.path().join("output.mp4");

        Ok(Self { dir, input, output })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the source video is downloaded.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Where the transcoder writes the finished video.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Remove the directory, reporting any failure.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scratch_is_removed_on_close() {
        let work = TempDir::new().unwrap();
        let scratch = JobScratch::create(work.path(), &JobId::from_string("abc"))
            .await
            .unwrap();

        assert!(scratch.path().starts_with(work.path()));
        assert_eq!(scratch.input().parent(), Some(scratch.path()));
        assert_eq!(scratch.output().file_name().unwrap(), "output.mp4");

        std::fs::write(scratch.input(), b"video").unwrap();
        let dir = scratch.path().to_path_buf();
        scratch.close().unwrap();

        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_scratch_is_removed_on_drop() {
        let work = TempDir::new().unwrap();
        let dir = {
            let scratch = JobScratch::create(work.path(), &JobId::new()).await.unwrap();
            std::fs::write(scratch.output(), b"partial").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!dir.exists());
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_creates_missing_work_dir() {
        let work = TempDir::new().unwrap();
        let nested = work.path().join("a/b");
        let scratch = JobScratch::create(&nested, &JobId::new()).await.unwrap();
        assert!(nested.is_dir());
        scratch.close().unwrap();
    }
}
