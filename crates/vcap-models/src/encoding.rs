//! Media and caption constants.

/// Timestamp of the frame sampled for captioning.
pub const FRAME_TIMESTAMP: &str = "00:00:01";
/// Width the sampled frame is scaled to (height keeps the aspect ratio).
pub const FRAME_SCALE_WIDTH: u32 = 320;
/// JPEG quality passed to `-q:v` (2 is best, 31 is worst).
pub const FRAME_JPEG_QUALITY: u8 = 10;

/// Caption used whenever the caption stage produces nothing usable.
pub const DEFAULT_CAPTION: &str = "편집된 영상입니다";

/// Content type of uploaded videos.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Vision-language model used for captioning.
pub const DEFAULT_CAPTION_MODEL: &str = "qwen2.5vl:7b";
