//! Job definitions for queue processing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::CaptionStyle;

/// Unique identifier for a received job.
///
/// Queue messages carry no identity of their own, so the worker assigns one
/// on receipt for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while decoding a queue message into a [`CaptionJob`].
#[derive(Debug, Error)]
pub enum JobDecodeError {
    #[error("Invalid job payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job field '{0}' is empty")]
    EmptyField(&'static str),
}

/// Caption burn-in job, decoded from one queue message.
///
/// Wire format: `{"input_key": "...", "output_key": "...", "variant": "v2"}`
/// where `variant` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionJob {
    /// Object key of the source video
    pub input_key: String,
    /// Object key the finished video is uploaded to
    pub output_key: String,
    /// Caption style selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl CaptionJob {
    /// Create a new job without a variant.
    pub fn new(input_key: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            input_key: input_key.into(),
            output_key: output_key.into(),
            variant: None,
        }
    }

    /// Set the caption variant.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Decode a raw queue payload.
    ///
    /// Missing or blank keys are rejected here so that a malformed job never
    /// reaches the pipeline.
    pub fn decode(payload: &[u8]) -> Result<Self, JobDecodeError> {
        let job: CaptionJob = serde_json::from_slice(payload)?;

        if job.input_key.trim().is_empty() {
            return Err(JobDecodeError::EmptyField("input_key"));
        }
        if job.output_key.trim().is_empty() {
            return Err(JobDecodeError::EmptyField("output_key"));
        }

        Ok(job)
    }

    /// Encode as a queue payload.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Resolve the caption style for this job.
    ///
    /// `fallback` applies when the job names no variant; an unknown variant
    /// resolves to the baseline style.
    pub fn style(&self, fallback: CaptionStyle) -> CaptionStyle {
        match self.variant.as_deref() {
            Some(variant) => CaptionStyle::from_variant(variant),
            None => fallback,
        }
    }
}
