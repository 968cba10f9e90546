//! Caption error types.

use thiserror::Error;

pub type CaptionResult<T> = Result<T, CaptionError>;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Frame sampling failed: {0}")]
    Sampling(#[from] vcap_media::MediaError),

    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Inference service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Invalid inference response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptionError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
