//! Caption generation: sample, describe, sanitize, fall back.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

use vcap_media::{FfmpegFrameSampler, FrameSampler};
use vcap_models::encoding::DEFAULT_CAPTION;
use vcap_models::CaptionStyle;

use crate::client::{OllamaClient, VisionModel};
use crate::config::CaptionConfig;
use crate::error::CaptionResult;
use crate::sanitize::sanitize;

/// Why a caption is the fixed default rather than model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// No frame could be extracted
    Sampling,
    /// The inference call failed
    Inference,
    /// The reply sanitized to nothing
    Empty,
    /// The caption stage exceeded its deadline
    Timeout,
    /// The caption service returned an error
    Error,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Sampling => "sampling",
            FallbackReason::Inference => "inference",
            FallbackReason::Empty => "empty",
            FallbackReason::Timeout => "timeout",
            FallbackReason::Error => "error",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caption ready for the overlay. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    /// Set when `text` is the default caption
    pub fallback: Option<FallbackReason>,
}

impl Caption {
    /// The default caption.
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            text: DEFAULT_CAPTION.to_string(),
            fallback: Some(reason),
        }
    }

    /// Model-derived caption; an empty text becomes the default.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::fallback(FallbackReason::Empty)
        } else {
            Self {
                text,
                fallback: None,
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Produces a caption for a video in a given style.
#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn caption(&self, video: &Path, style: CaptionStyle) -> CaptionResult<Caption>;
}

/// Samples one frame, asks the vision model, and cleans up the reply.
///
/// Every failure degrades to the default caption; `caption` never errors.
pub struct CaptionGenerator {
    sampler: Arc<dyn FrameSampler>,
    model: Arc<dyn VisionModel>,
    strict_charset: bool,
}

impl CaptionGenerator {
    pub fn new(sampler: Arc<dyn FrameSampler>, model: Arc<dyn VisionModel>) -> Self {
        Self {
            sampler,
            model,
            strict_charset: false,
        }
    }

    /// FFmpeg sampler plus Ollama client, as configured.
    pub fn from_config(config: &CaptionConfig) -> CaptionResult<Self> {
        let sampler = FfmpegFrameSampler::new().with_timeout(config.sample_timeout);
        let model = OllamaClient::new(config)?;
        Ok(Self::new(Arc::new(sampler), Arc::new(model)).with_strict_charset(config.strict_charset))
    }

    /// Filter replies to the style's character set and length.
    pub fn with_strict_charset(mut self, strict: bool) -> Self {
        self.strict_charset = strict;
        self
    }

    /// Sample a frame next to the video and return it base64-encoded.
    ///
    /// The frame file is removed when this returns.
    async fn sample_frame(&self, video: &Path) -> CaptionResult<String> {
        let dir = video
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let frame = tempfile::Builder::new()
            .prefix("frame-")
            .suffix(".jpg")
            .tempfile_in(dir)?;

        self.sampler.sample(video, frame.path()).await?;
        let bytes = tokio::fs::read(frame.path()).await?;
        debug!("Encoding {} byte frame", bytes.len());

        Ok(STANDARD.encode(bytes))
    }

    fn clean(&self, reply: &str, style: CaptionStyle) -> String {
        let text = sanitize(reply);
        if self.strict_charset {
            style.enforce(&text)
        } else {
            text
        }
    }

    /// Generate a caption; never fails.
    pub async fn generate(&self, video: &Path, style: CaptionStyle) -> Caption {
        let image = match self.sample_frame(video).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Frame sampling failed for {}: {}", video.display(), e);
                return Caption::fallback(FallbackReason::Sampling);
            }
        };

        let reply = match self.model.describe(&image, style.prompt()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Caption inference failed ({}): {}", style, e);
                return Caption::fallback(FallbackReason::Inference);
            }
        };

        let caption = Caption::from_text(self.clean(&reply, style));
        if caption.is_fallback() {
            warn!("Caption reply {:?} sanitized to nothing", reply);
        } else {
            info!("Generated caption ({}): {}", style, caption.text);
        }
        caption
    }
}

#[async_trait]
impl CaptionService for CaptionGenerator {
    async fn caption(&self, video: &Path, style: CaptionStyle) -> CaptionResult<Caption> {
        Ok(self.generate(video, style).await)
    }
}
