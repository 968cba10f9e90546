//! In-memory fakes shared by the worker integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use vcap_caption::{Caption, CaptionError, CaptionResult, CaptionService};
use vcap_media::{FrameSampler, MediaError, MediaResult, TranscodeRequest, TranscodeService};
use vcap_models::CaptionStyle;
use vcap_queue::{MessageSource, QueueResult};
use vcap_storage::LocalStore;
use vcap_worker::{JobPipeline, WorkerConfig};

/// How the fake caption service answers.
#[derive(Clone)]
pub enum CaptionBehavior {
    Text(&'static str),
    Fail,
    Hang,
}

pub struct FakeCaptioner {
    behavior: CaptionBehavior,
    pub styles: Mutex<Vec<CaptionStyle>>,
}

impl FakeCaptioner {
    pub fn new(behavior: CaptionBehavior) -> Self {
        Self {
            behavior,
            styles: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CaptionService for FakeCaptioner {
    async fn caption(&self, _video: &Path, style: CaptionStyle) -> CaptionResult<Caption> {
        self.styles.lock().unwrap().push(style);
        match self.behavior {
            CaptionBehavior::Text(text) => Ok(Caption::from_text(text)),
            CaptionBehavior::Fail => Err(CaptionError::invalid_response("scripted failure")),
            CaptionBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Caption::from_text("too late"))
            }
        }
    }
}

/// How the fake transcoder behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TranscodeBehavior {
    /// Copy input to output
    Copy,
    /// Exit non-zero
    Fail,
    /// Exit zero without writing output
    NoOutput,
}

pub struct FakeTranscoder {
    behavior: TranscodeBehavior,
    pub requests: Mutex<Vec<TranscodeRequest>>,
}

impl FakeTranscoder {
    pub fn new(behavior: TranscodeBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn captions(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.caption.clone())
            .collect()
    }
}

#[async_trait]
impl TranscodeService for FakeTranscoder {
    async fn transcode(&self, request: &TranscodeRequest) -> MediaResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior {
            TranscodeBehavior::Copy => {
                let mut bytes = tokio::fs::read(&request.input).await?;
                bytes.extend_from_slice(request.caption.as_bytes());
                tokio::fs::write(&request.output, bytes).await?;
                Ok(())
            }
            TranscodeBehavior::Fail => Err(MediaError::script_failed(Some(1), "drawtext failed")),
            TranscodeBehavior::NoOutput => Ok(()),
        }
    }
}

/// Writes a fixed JPEG stand-in.
pub struct StaticSampler;

#[async_trait]
impl FrameSampler for StaticSampler {
    async fn sample(&self, _video: &Path, frame: &Path) -> MediaResult<()> {
        tokio::fs::write(frame, b"jpeg").await?;
        Ok(())
    }
}

/// Replays scripted pop results, then idles.
pub struct ScriptedSource {
    replies: Mutex<VecDeque<QueueResult<Option<Vec<u8>>>>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<QueueResult<Option<Vec<u8>>>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn pop(&self) -> QueueResult<Option<Vec<u8>>> {
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(None)
            }
        }
    }
}

/// Holds one message back for `delay` before returning it, then idles.
pub struct DelayedSource {
    delay: Duration,
    message: Mutex<Option<Vec<u8>>>,
    pub popping: tokio::sync::Notify,
}

impl DelayedSource {
    pub fn new(delay: Duration, message: &[u8]) -> Self {
        Self {
            delay,
            message: Mutex::new(Some(message.to_vec())),
            popping: tokio::sync::Notify::new(),
        }
    }
}

#[async_trait]
impl MessageSource for DelayedSource {
    async fn pop(&self) -> QueueResult<Option<Vec<u8>>> {
        self.popping.notify_one();
        tokio::time::sleep(self.delay).await;
        Ok(self.message.lock().unwrap().take())
    }
}

/// Object store root and work dir for one test.
pub struct Harness {
    pub store_root: TempDir,
    pub work_dir: TempDir,
    pub store: Arc<LocalStore>,
}

impl Harness {
    pub fn new() -> Self {
        let store_root = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(store_root.path()));
        Self {
            store_root,
            work_dir,
            store,
        }
    }

    /// Seed an object in the store.
    pub fn put(&self, key: &str, bytes: &[u8]) {
        let path = self.object(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    pub fn object(&self, key: &str) -> PathBuf {
        self.store_root.path().join(key)
    }

    pub fn config(&self) -> WorkerConfig {
        WorkerConfig {
            work_dir: self.work_dir.path().to_path_buf(),
            caption_timeout: Duration::from_secs(5),
            ..WorkerConfig::default()
        }
    }

    pub fn pipeline(
        &self,
        config: &WorkerConfig,
        captioner: Arc<dyn CaptionService>,
        transcoder: Arc<dyn TranscodeService>,
    ) -> JobPipeline {
        JobPipeline::new(self.store.clone(), captioner, transcoder, config)
    }

    /// Whether the work dir holds no leftovers.
    pub fn work_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.work_dir.path()).unwrap().count() == 0
    }
}
