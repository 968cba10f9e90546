//! Frame sampling for captioning.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use vcap_models::encoding::{FRAME_JPEG_QUALITY, FRAME_SCALE_WIDTH, FRAME_TIMESTAMP};

/// Extracts one representative still frame from a video.
#[async_trait]
pub trait FrameSampler: Send + Sync {
    /// Write one JPEG frame of `video` to `frame`.
    async fn sample(&self, video: &Path, frame: &Path) -> MediaResult<()>;
}

/// FFmpeg-backed sampler: one frame at a fixed early timestamp, downscaled.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSampler {
    timestamp: String,
    scale_width: u32,
    quality: u8,
    runner: FfmpegRunner,
}

impl Default for FfmpegFrameSampler {
    fn default() -> Self {
        Self {
            timestamp: FRAME_TIMESTAMP.to_string(),
            scale_width: FRAME_SCALE_WIDTH,
            quality: FRAME_JPEG_QUALITY,
            runner: FfmpegRunner::new(),
        }
    }
}

impl FfmpegFrameSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the FFmpeg run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner = self.runner.with_timeout(timeout);
        self
    }

    /// Build the FFmpeg command for a sample.
    pub fn command(&self, video: &Path, frame: &Path) -> FfmpegCommand {
        FfmpegCommand::new(video, frame)
            .seek_to(self.timestamp.clone())
            .video_filter(format!("scale={}:-1", self.scale_width))
            .single_frame()
            .quality(self.quality)
            .log_level("error")
    }
}

#[async_trait]
impl FrameSampler for FfmpegFrameSampler {
    async fn sample(&self, video: &Path, frame: &Path) -> MediaResult<()> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        self.runner.run(&self.command(video, frame)).await?;

        // FFmpeg exits cleanly without writing anything when the seek lands
        // past the end of a short clip.
        let written = tokio::fs::metadata(frame)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(MediaError::MissingOutput(frame.to_path_buf()));
        }

        debug!("Sampled {} byte frame from {}", written, video.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_command() {
        let sampler = FfmpegFrameSampler::new();
        let args = sampler
            .command(Path::new("/tmp/in.mp4"), Path::new("/tmp/frame.jpg"))
            .build_args();

        assert!(args.windows(2).any(|w| w == ["-ss", "00:00:01"]));
        assert!(args.windows(2).any(|w| w == ["-vf", "scale=320:-1"]));
        assert!(args.windows(2).any(|w| w == ["-frames:v", "1"]));
        assert!(args.windows(2).any(|w| w == ["-q:v", "10"]));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/frame.jpg"));
    }

    #[tokio::test]
    async fn test_sample_missing_video() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = FfmpegFrameSampler::new()
            .sample(&dir.path().join("missing.mp4"), &dir.path().join("f.jpg"))
            .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
