//! Caption burn-in worker.
//!
//! This crate provides:
//! - [`JobPipeline`]: download, caption, transcode, upload for one job
//! - [`QueueConsumer`]: the long-running queue loop
//! - Per-job scratch directories that are removed on every outcome
//! - Structured job logging and Prometheus metrics

pub mod config;
pub mod consumer;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod scratch;

pub use config::WorkerConfig;
pub use consumer::{MessageOutcome, QueueConsumer};
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use pipeline::{JobPipeline, JobReport};
pub use scratch::JobScratch;
