//! Queue consumer loop.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use vcap_models::{CaptionJob, JobId};
use vcap_queue::{MessageSource, QueueConfig};

use crate::metrics;
use crate::pipeline::JobPipeline;

/// Longest payload excerpt logged for a malformed message.
const PAYLOAD_LOG_LIMIT: usize = 200;

/// What happened to one queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The job ran and its output was uploaded
    Completed,
    /// The job hit a fatal stage error
    Failed,
    /// The message could not be decoded and was discarded
    Dropped,
}

impl MessageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOutcome::Completed => "completed",
            MessageOutcome::Failed => "failed",
            MessageOutcome::Dropped => "dropped",
        }
    }
}

impl fmt::Display for MessageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pulls jobs one at a time and runs them through the pipeline.
///
/// Jobs run strictly in delivery order. Shutdown is checked between pops:
/// a pop in flight is allowed to finish (it is bounded by the queue's pop
/// timeout), and a message it returns is run before the loop stops. Only a
/// backoff sleep is cut short.
pub struct QueueConsumer {
    source: Arc<dyn MessageSource>,
    pipeline: JobPipeline,
    queue: QueueConfig,
    shutdown: watch::Sender<bool>,
}

impl QueueConsumer {
    pub fn new(source: Arc<dyn MessageSource>, pipeline: JobPipeline, queue: &QueueConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            source,
            pipeline,
            queue: queue.clone(),
            shutdown,
        }
    }

    /// Ask `run` to return once the current pop and job, if any, have finished.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Consume until shutdown. Queue errors are retried after a backoff.
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown.subscribe();
        info!("Queue consumer started");

        loop {
            let stop = *shutdown_rx.borrow_and_update();
            if stop {
                break;
            }

            match self.source.pop().await {
                Ok(Some(payload)) => {
                    self.handle_message(&payload).await;
                }
                Ok(None) => debug!("No job within pop timeout"),
                Err(e) => {
                    metrics::record_queue_error(e.kind());
                    let backoff = self.queue.backoff_for(&e);
                    if e.is_transient() {
                        error!("Queue unreachable, retrying in {:?}: {}", backoff, e);
                    } else {
                        warn!("Queue error, retrying in {:?}: {}", backoff, e);
                    }

                    tokio::select! {
                        _ = shutdown_rx.changed() => {}
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!("Queue consumer stopped");
    }

    /// Decode one message and run it. Never panics and never re-queues.
    pub async fn handle_message(&self, payload: &[u8]) -> MessageOutcome {
        let job = match CaptionJob::decode(payload) {
            Ok(job) => job,
            Err(e) => {
                let excerpt: String = String::from_utf8_lossy(payload)
                    .chars()
                    .take(PAYLOAD_LOG_LIMIT)
                    .collect();
                warn!(payload = %excerpt, "Dropping malformed job message: {}", e);
                metrics::record_message(MessageOutcome::Dropped.as_str());
                return MessageOutcome::Dropped;
            }
        };

        let job_id = JobId::new();
        info!(
            job_id = %job_id,
            input_key = %job.input_key,
            output_key = %job.output_key,
            "Received job"
        );

        let started = Instant::now();
        let outcome = match self.pipeline.run(&job_id, &job).await {
            Ok(_) => MessageOutcome::Completed,
            Err(_) => MessageOutcome::Failed,
        };

        metrics::record_job(outcome.as_str(), started.elapsed());
        metrics::record_message(outcome.as_str());
        outcome
    }
}
