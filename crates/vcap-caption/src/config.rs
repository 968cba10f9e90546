//! Caption configuration.

use std::time::Duration;

use vcap_models::encoding::DEFAULT_CAPTION_MODEL;

/// Caption generation configuration.
#[derive(Debug, Clone)]
pub struct CaptionConfig {
    /// Base URL of the Ollama-compatible inference service
    pub host: String,
    /// Model identifier
    pub model: String,
    /// Timeout for one inference call
    pub inference_timeout: Duration,
    /// Timeout for frame extraction
    pub sample_timeout: Duration,
    /// Filter model output to the style's character set and length
    pub strict_charset: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:11434".to_string(),
            model: DEFAULT_CAPTION_MODEL.to_string(),
            inference_timeout: Duration::from_secs(120),
            sample_timeout: Duration::from_secs(60),
            strict_charset: false,
        }
    }
}

impl CaptionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("OLLAMA_HOST").unwrap_or(defaults.host),
            model: std::env::var("CAPTION_MODEL").unwrap_or(defaults.model),
            inference_timeout: std::env::var("INFERENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.inference_timeout),
            sample_timeout: std::env::var("FRAME_SAMPLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.sample_timeout),
            strict_charset: std::env::var("CAPTION_STRICT_CHARSET")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.strict_charset),
        }
    }

    /// Chat endpoint URL.
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptionConfig::default();
        assert_eq!(config.model, "qwen2.5vl:7b");
        assert_eq!(config.inference_timeout, Duration::from_secs(120));
        assert!(!config.strict_charset);
    }

    #[test]
    fn test_chat_url() {
        let mut config = CaptionConfig::default();
        assert_eq!(config.chat_url(), "http://127.0.0.1:11434/api/chat");

        config.host = "http://gpu-box:11434/".to_string();
        assert_eq!(config.chat_url(), "http://gpu-box:11434/api/chat");
    }
}
