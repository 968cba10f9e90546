//! Structured job logging utilities.
//!
//! Every line carries the job ID and the keys it moves between, so one job
//! can be followed through the log stream.

use tracing::{error, info, warn, Span};
use vcap_models::{CaptionJob, JobId, JobStage};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    input_key: String,
    output_key: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId, job: &CaptionJob) -> Self {
        Self {
            job_id: job_id.to_string(),
            input_key: job.input_key.clone(),
            output_key: job.output_key.clone(),
        }
    }

    /// Log the start of a job.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            input_key = %self.input_key,
            output_key = %self.output_key,
            "Job started: {}", message
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: JobStage) {
        info!(
            job_id = %self.job_id,
            stage = %stage,
            "Job progress: {}", stage
        );
    }

    /// Log a degraded but non-fatal condition.
    pub fn log_warning(&self, stage: JobStage, message: &str) {
        warn!(
            job_id = %self.job_id,
            stage = %stage,
            "Job warning: {}", message
        );
    }

    /// Log a fatal stage error.
    pub fn log_error(&self, stage: JobStage, message: &str) {
        error!(
            job_id = %self.job_id,
            input_key = %self.input_key,
            output_key = %self.output_key,
            stage = %stage,
            "Job error: {}", message
        );
    }

    /// Log the completion of a job.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            output_key = %self.output_key,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            input_key = %self.input_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::new();
        let job = CaptionJob::new("in/a.mp4", "out/a.mp4");
        let logger = JobLogger::new(&job_id, &job);

        assert_eq!(logger.job_id(), job_id.to_string());
        assert_eq!(logger.input_key, "in/a.mp4");
        assert_eq!(logger.output_key, "out/a.mp4");
    }
}
