//! One job, end to end.
//!
//! `Received → Downloading → Captioning → Transcoding → Uploading → Completed`.
//! Download, transcode and upload failures end the job; caption failures are
//! absorbed and the default caption is used instead. The scratch directory is
//! removed on every path, and nothing is uploaded unless every fatal stage
//! succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{warn, Instrument};

use vcap_caption::{Caption, CaptionService, FallbackReason};
use vcap_media::{MediaError, TranscodeRequest, TranscodeService};
use vcap_models::encoding::VIDEO_CONTENT_TYPE;
use vcap_models::{CaptionJob, CaptionStyle, JobId, JobStage};
use vcap_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::scratch::JobScratch;

/// Summary of a completed job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: JobId,
    /// Caption burned into the output
    pub caption: String,
    /// Set when the default caption was used
    pub caption_fallback: Option<FallbackReason>,
    pub elapsed: Duration,
}

/// Runs jobs against injected store, caption and transcode services.
pub struct JobPipeline {
    store: Arc<dyn ObjectStore>,
    captioner: Arc<dyn CaptionService>,
    transcoder: Arc<dyn TranscodeService>,
    work_dir: PathBuf,
    caption_timeout: Duration,
    default_style: CaptionStyle,
}

impl JobPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        captioner: Arc<dyn CaptionService>,
        transcoder: Arc<dyn TranscodeService>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            store,
            captioner,
            transcoder,
            work_dir: config.work_dir.clone(),
            caption_timeout: config.caption_timeout,
            default_style: config.default_style,
        }
    }

    /// Run one job to completion or to its first fatal error.
    pub async fn run(&self, job_id: &JobId, job: &CaptionJob) -> WorkerResult<JobReport> {
        let logger = JobLogger::new(job_id, job);
        let span = logger.create_span();
        self.run_logged(&logger, job_id, job).instrument(span).await
    }

    async fn run_logged(
        &self,
        logger: &JobLogger,
        job_id: &JobId,
        job: &CaptionJob,
    ) -> WorkerResult<JobReport> {
        let started = Instant::now();
        let style = job.style(self.default_style);
        logger.log_start(&format!("style {}", style));

        let scratch = JobScratch::create(&self.work_dir, job_id).await?;
        let result = self.execute(logger, &scratch, job, style).await;

        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch directory: {}", e);
        }

        match result {
            Ok(caption) => {
                let report = JobReport {
                    job_id: job_id.clone(),
                    caption: caption.text,
                    caption_fallback: caption.fallback,
                    elapsed: started.elapsed(),
                };
                logger.log_completion(&format!(
                    "caption {:?} in {:.1}s",
                    report.caption,
                    report.elapsed.as_secs_f64()
                ));
                Ok(report)
            }
            Err(e) => {
                let stage = e.stage().unwrap_or(JobStage::Received);
                logger.log_error(stage, &e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        logger: &JobLogger,
        scratch: &JobScratch,
        job: &CaptionJob,
        style: CaptionStyle,
    ) -> WorkerResult<Caption> {
        logger.log_stage(JobStage::Downloading);
        self.store
            .download(&job.input_key, scratch.input())
            .await
            .map_err(WorkerError::Download)?;

        logger.log_stage(JobStage::Captioning);
        let caption = self.caption(logger, scratch.input(), style).await;

        logger.log_stage(JobStage::Transcoding);
        let request = TranscodeRequest::new(scratch.input(), scratch.output(), caption.text.clone());
        self.transcoder.transcode(&request).await?;
        ensure_output(scratch.output()).await?;

        logger.log_stage(JobStage::Uploading);
        self.store
            .upload(scratch.output(), &job.output_key, VIDEO_CONTENT_TYPE)
            .await
            .map_err(WorkerError::Upload)?;

        Ok(caption)
    }

    /// Caption stage. Never fails: errors, timeouts and empty text all
    /// become the default caption.
    async fn caption(&self, logger: &JobLogger, video: &Path, style: CaptionStyle) -> Caption {
        let caption = match tokio::time::timeout(
            self.caption_timeout,
            self.captioner.caption(video, style),
        )
        .await
        {
            Ok(Ok(caption)) if caption.text.trim().is_empty() => {
                Caption::fallback(FallbackReason::Empty)
            }
            Ok(Ok(caption)) => caption,
            Ok(Err(e)) => {
                logger.log_warning(JobStage::Captioning, &format!("caption service failed: {}", e));
                Caption::fallback(FallbackReason::Error)
            }
            Err(_) => {
                logger.log_warning(
                    JobStage::Captioning,
                    &format!("caption timed out after {}s", self.caption_timeout.as_secs()),
                );
                Caption::fallback(FallbackReason::Timeout)
            }
        };

        if let Some(reason) = caption.fallback {
            metrics::record_caption_fallback(reason.as_str());
        }
        caption
    }
}

/// A zero exit without an output file is still a transcode failure.
async fn ensure_output(output: &Path) -> WorkerResult<()> {
    if tokio::fs::try_exists(output).await.map_err(MediaError::Io)? {
        Ok(())
    } else {
        Err(MediaError::MissingOutput(output.to_path_buf()).into())
    }
}
