//! Model gateway traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Multimodal model client.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Ask the model about the image referenced by `request.image_url`.
    async fn describe_image(&self, request: &VisionRequest) -> Result<VisionResponse>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// A single instruction plus image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionRequest {
    /// Text instruction.
    pub instruction: String,
    /// URL of the image; never inline bytes.
    pub image_url: String,
}

/// Response from a vision model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionResponse {
    /// Text content of the reply.
    pub content: String,
    /// Finish reason, when the provider reports one.
    pub finish_reason: Option<String>,
    /// Token usage.
    pub usage: VisionUsage,
}

/// Token usage from a model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionUsage {
    /// Prompt tokens.
    pub prompt_tokens: u64,
    /// Completion tokens.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}
