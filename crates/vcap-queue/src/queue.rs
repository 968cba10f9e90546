//! Job queue on a Redis list.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use vcap_models::CaptionJob;

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// List holding pending job messages
    pub queue_name: String,
    /// Bounded wait for one pop; expiry is the idle heartbeat
    pub pop_timeout: Duration,
    /// Wait before retrying after the queue becomes unreachable
    pub reconnect_backoff: Duration,
    /// Wait before retrying after any other queue error
    pub error_backoff: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://redis:6379".to_string(),
            queue_name: "video_processing_jobs".to_string(),
            pop_timeout: Duration::from_secs(5),
            reconnect_backoff: Duration::from_secs(5),
            error_backoff: Duration::from_secs(1),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    ///
    /// `REDIS_URL` wins over `REDIS_HOST`/`REDIS_PORT`.
    pub fn from_env() -> Self {
        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| {
            let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "redis".to_string());
            let port = std::env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
            format!("redis://{}:{}", host, port)
        });

        Self {
            redis_url,
            queue_name: std::env::var("REDIS_QUEUE")
                .unwrap_or_else(|_| "video_processing_jobs".to_string()),
            pop_timeout: Duration::from_secs(
                std::env::var("QUEUE_POP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            reconnect_backoff: Duration::from_secs(
                std::env::var("QUEUE_RECONNECT_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            error_backoff: Duration::from_secs(1),
        }
    }

    /// Backoff to apply after a failed pop.
    pub fn backoff_for(&self, error: &QueueError) -> Duration {
        if error.is_transient() {
            self.reconnect_backoff
        } else {
            self.error_backoff
        }
    }
}

/// Where the consumer gets raw job messages from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait a bounded time for one message. `None` means the wait expired.
    async fn pop(&self) -> QueueResult<Option<Vec<u8>>>;
}

/// Redis list job queue.
pub struct JobQueue {
    client: redis::Client,
    config: QueueConfig,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl JobQueue {
    /// Create a new job queue. No connection is made until first use.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self {
            client,
            config,
            conn: Mutex::new(None),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Shared connection, opened lazily and reopened after a transport error.
    async fn connection(&self) -> QueueResult<MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::connection_failed(format!("{}: {}", self.config.redis_url, e)))?;
        info!("Connected to Redis queue {}", self.config.queue_name);
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Forget the cached connection if `error` means it is unusable.
    async fn on_error(&self, error: &QueueError) {
        if error.is_transient() {
            *self.conn.lock().await = None;
        }
    }

    /// Enqueue a job at the head of the list.
    pub async fn push(&self, job: &CaptionJob) -> QueueResult<()> {
        let payload = job.encode()?;
        self.push_raw(payload.as_bytes()).await
    }

    /// Enqueue an arbitrary payload. Used by tooling to inject test messages.
    pub async fn push_raw(&self, payload: &[u8]) -> QueueResult<()> {
        let mut conn = self.connection().await?;
        let result: Result<usize, _> = conn.lpush(&self.config.queue_name, payload.to_vec()).await;
        match result {
            Ok(len) => {
                debug!("Pushed message onto {} (length {})", self.config.queue_name, len);
                Ok(())
            }
            Err(e) => {
                let err = QueueError::from(e);
                self.on_error(&err).await;
                Err(err)
            }
        }
    }

    /// Number of pending messages.
    pub async fn len(&self) -> QueueResult<usize> {
        let mut conn = self.connection().await?;
        let len: usize = conn.llen(&self.config.queue_name).await?;
        Ok(len)
    }

    /// Round-trip a `PING`.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self.connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            warn!("Unexpected PING reply: {}", reply);
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSource for JobQueue {
    async fn pop(&self) -> QueueResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let timeout = self.config.pop_timeout.as_secs_f64();

        let result: Result<Option<(String, Vec<u8>)>, _> =
            conn.brpop(&self.config.queue_name, timeout).await;

        match result {
            Ok(Some((_, payload))) => Ok(Some(payload)),
            Ok(None) => Ok(None),
            Err(e) => {
                let err = QueueError::from(e);
                self.on_error(&err).await;
                Err(err)
            }
        }
    }
}
