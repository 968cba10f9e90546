//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use vcap_models::CaptionStyle;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent directory for per-job scratch directories
    pub work_dir: PathBuf,
    /// Hard bound on the whole caption stage
    pub caption_timeout: Duration,
    /// Overlay script invoked for the transcode stage
    pub ffmpeg_script: PathBuf,
    /// Style used when a job names no variant
    pub default_style: CaptionStyle,
    /// Port for the Prometheus exporter; no exporter when unset
    pub metrics_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            caption_timeout: Duration::from_secs(600),
            ffmpeg_script: PathBuf::from("/opt/ai/scripts/run_ffmpeg_shorts.sh"),
            default_style: CaptionStyle::default(),
            metrics_port: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            caption_timeout: std::env::var("CAPTION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.caption_timeout),
            ffmpeg_script: std::env::var("FFMPEG_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_script),
            default_style: std::env::var("CAPTION_VARIANT")
                .map(|v| CaptionStyle::from_variant(&v))
                .unwrap_or(defaults.default_style),
            metrics_port: std::env::var("METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
