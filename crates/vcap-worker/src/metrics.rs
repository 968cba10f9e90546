//! Worker metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless a
//! recorder is installed with [`install_exporter`].

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{WorkerError, WorkerResult};

/// Metric name constants for consistency.
pub mod names {
    /// Queue messages by outcome (completed, failed, dropped).
    pub const MESSAGES_TOTAL: &str = "vcap_messages_total";

    /// Decoded jobs by final status.
    pub const JOBS_TOTAL: &str = "vcap_jobs_total";

    /// Jobs that used the default caption, by reason.
    pub const CAPTION_FALLBACKS_TOTAL: &str = "vcap_caption_fallbacks_total";

    /// Failed queue pops by kind (transport, other).
    pub const QUEUE_ERRORS_TOTAL: &str = "vcap_queue_errors_total";

    /// Wall time per job in seconds.
    pub const JOB_DURATION_SECONDS: &str = "vcap_job_duration_seconds";
}

/// Serve Prometheus metrics on `0.0.0.0:port`.
pub fn install_exporter(port: u16) -> WorkerResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .install()
        .map_err(|e| WorkerError::config_error(format!("Failed to install metrics exporter: {}", e)))
}

pub fn record_message(outcome: &str) {
    counter!(names::MESSAGES_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

/// Record a finished job.
pub fn record_job(status: &str, elapsed: Duration) {
    counter!(names::JOBS_TOTAL, "status" => status.to_string()).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, "status" => status.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_caption_fallback(reason: &str) {
    counter!(names::CAPTION_FALLBACKS_TOTAL, "reason" => reason.to_string()).increment(1);
}

pub fn record_queue_error(kind: &str) {
    counter!(names::QUEUE_ERRORS_TOTAL, "kind" => kind.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        for name in [
            names::MESSAGES_TOTAL,
            names::JOBS_TOTAL,
            names::CAPTION_FALLBACKS_TOTAL,
            names::QUEUE_ERRORS_TOTAL,
            names::JOB_DURATION_SECONDS,
        ] {
            assert!(name.starts_with("vcap_"));
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_message("dropped");
        record_job("completed", Duration::from_millis(5));
        record_caption_fallback("timeout");
        record_queue_error("transport");
    }
}
