//! Caption sanitization.
//!
//! The overlay script draws the caption with FFmpeg's `drawtext`, where
//! quotes, brackets, colons and line breaks break filter parsing.

/// Characters removed from model output.
pub const STRIPPED_CHARS: &[char] = &['\n', '\r', '\'', '"', '(', ')', '[', ']', '#', '*', ':', '.'];

/// Remove structural characters and trim surrounding whitespace.
pub fn sanitize(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    stripped.trim().to_string()
}
