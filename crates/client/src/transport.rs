//! Calls to the analysis endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use wordlens_core::{
    types::{AnalysisEnvelope, AnalyzeImageRequest, ErrorBody},
    Error, Result,
};

use crate::state::FileCandidate;

/// Sends an image to the analysis endpoint in one of its two body shapes.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// `{ "image": url }` as JSON.
    async fn analyze_url(&self, image_url: &str) -> Result<AnalysisEnvelope>;

    /// The file as multipart field `file`.
    async fn analyze_file(&self, file: &FileCandidate) -> Result<AnalysisEnvelope>;
}

/// HTTP transport built on `reqwest`.
pub struct HttpAnalysisTransport {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
}

impl HttpAnalysisTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Send the key as both `Authorization: Bearer` and `apikey`.
    pub fn with_api_key(mut self, key: Secret<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder
                .bearer_auth(key.expose_secret())
                .header("apikey", key.expose_secret()),
            None => builder,
        }
    }

    async fn read_envelope(response: reqwest::Response) -> Result<AnalysisEnvelope> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| Error::transport(format!("Invalid response body: {}", e)));
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Analysis service returned {}", status));
        tracing::warn!(status = %status, message = %message, "Analysis request failed");
        Err(Error::Service(message))
    }
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout("analysis request timed out".to_string())
    } else {
        Error::transport(e.to_string())
    }
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisTransport {
    async fn analyze_url(&self, image_url: &str) -> Result<AnalysisEnvelope> {
        tracing::debug!(endpoint = %self.endpoint, image_url = %image_url, "Requesting analysis by URL");

        let body = AnalyzeImageRequest {
            image: Some(image_url.to_string()),
        };
        let response = self
            .authorize(self.http.post(&self.endpoint).json(&body))
            .send()
            .await
            .map_err(send_error)?;

        Self::read_envelope(response).await
    }

    async fn analyze_file(&self, file: &FileCandidate) -> Result<AnalysisEnvelope> {
        tracing::debug!(
            endpoint = %self.endpoint,
            file_name = %file.name,
            size = file.data.len(),
            "Requesting analysis by upload"
        );

        let part = reqwest::multipart::Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|_| Error::InvalidFileType(file.content_type.clone()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorize(self.http.post(&self.endpoint).multipart(form))
            .send()
            .await
            .map_err(send_error)?;

        Self::read_envelope(response).await
    }
}
