//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    /// Whether the queue itself is unreachable, as opposed to a bad reply.
    ///
    /// Transport failures get the long reconnect backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            QueueError::ConnectionFailed(_) => true,
            QueueError::Redis(e) => {
                e.is_connection_refusal()
                    || e.is_connection_dropped()
                    || e.is_io_error()
                    || e.is_timeout()
            }
            QueueError::Json(_) => false,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        if self.is_transient() {
            "transport"
        } else {
            "other"
        }
    }
}
