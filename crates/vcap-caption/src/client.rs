//! Ollama chat client for single-image captions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CaptionConfig;
use crate::error::{CaptionError, CaptionResult};

/// A vision-language model that answers one instruction about one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Ask the model about a base64-encoded image. Returns the raw reply.
    async fn describe(&self, image_base64: &str, prompt: &str) -> CaptionResult<String>;
}

/// Chat request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
    images: Vec<&'a str>,
}

/// Chat response body. Only the reply text is used.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the Ollama `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client. The configured inference timeout bounds every call.
    pub fn new(config: &CaptionConfig) -> CaptionResult<Self> {
        let client = Client::builder()
            .timeout(config.inference_timeout)
            .build()
            .map_err(|e| CaptionError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.chat_url(),
            model: config.model.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl VisionModel for OllamaClient {
    async fn describe(&self, image_base64: &str, prompt: &str) -> CaptionResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images: vec![image_base64],
            }],
            stream: false,
        };

        debug!("Requesting caption from {} ({})", self.url, self.model);

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CaptionError::Service { status, body });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::invalid_response(e.to_string()))?;

        Ok(body
            .message
            .and_then(|m| m.content)
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}
