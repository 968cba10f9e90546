//! FFmpeg and overlay-script wrappers for caption burn-in.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and running with timeouts
//! - Single-frame sampling for captioning ([`FrameSampler`])
//! - The external overlay script contract ([`TranscodeService`])

pub mod command;
pub mod error;
pub mod frame;
pub mod overlay;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frame::{FfmpegFrameSampler, FrameSampler};
pub use overlay::{OverlayScript, TranscodeRequest, TranscodeService};
