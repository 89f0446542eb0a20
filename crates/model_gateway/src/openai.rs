//! OpenAI-compatible vision client.
//!
//! Sends one chat-completion request per image with a text block and an
//! `image_url` block. Works against any provider exposing
//! `POST {base_url}/chat/completions`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use wordlens_core::{
    config::ModelConfig,
    traits::{VisionClient, VisionRequest, VisionResponse, VisionUsage},
    Error, Result,
};

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

// =============================================================================
// Client
// =============================================================================

/// Vision client for OpenAI-compatible chat-completion endpoints.
pub struct OpenAiVisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
    model: String,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl OpenAiVisionClient {
    /// Create a client from configuration.
    ///
    /// The HTTP client is built once and reused for every call.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            tracing::warn!("No inference API key configured; requests will be unauthenticated");
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn describe_image(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentBlock::Text {
                        text: &request.instruction,
                    },
                    ContentBlock::ImageUrl {
                        image_url: ImageUrl {
                            url: &request.image_url,
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        };

        tracing::info!(model = %self.model, image_url = %request.image_url, "Calling vision model");

        let mut builder = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!(
                    "inference call exceeded {}s",
                    self.timeout.as_secs()
                ))
            } else {
                Error::inference(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            tracing::warn!(status = %status, message = %message, "Vision model returned an error");
            return Err(Error::inference(format!("{}: {}", status, message)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::inference(format!("invalid response body: {}", e)))?;

        let usage = parsed
            .usage
            .map(|u| VisionUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::inference("model returned no choices"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::inference("model returned no content"))?;

        tracing::debug!(
            content_len = content.len(),
            total_tokens = usage.total_tokens,
            "Vision model replied"
        );

        Ok(VisionResponse {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
