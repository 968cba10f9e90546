//! Shared data models for the caption worker.
//!
//! This crate provides Serde-serializable types for:
//! - Queue jobs and their decoding rules
//! - Pipeline stages
//! - Caption styles (the prompt registry)
//! - Encoding constants shared by the media and caption crates

pub mod encoding;
pub mod job;
pub mod stage;
pub mod style;

// Re-export common types
pub use job::{CaptionJob, JobDecodeError, JobId};
pub use stage::JobStage;
pub use style::CaptionStyle;
