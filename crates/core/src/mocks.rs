//! Mock implementations of core traits for testing.
//!
//! Shared by unit and integration tests across the workspace so that no test
//! needs network access, a bucket, or a database.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use crate::{
    traits::{AnalysisRepository, ObjectStore, VisionClient, VisionRequest, VisionResponse, VisionUsage},
    types::AnalysisRecord,
    Error, Result,
};

// =============================================================================
// Mock Vision Client
// =============================================================================

/// Scripted vision model that replies with predefined text.
pub struct MockVisionClient {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<VisionRequest>>,
    failure: Option<String>,
}

impl MockVisionClient {
    /// Create a mock that replies with `responses` in turn, repeating the last.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock whose every call fails with an inference error.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// Number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn describe_image(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = &self.failure {
            return Err(Error::inference(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        let idx = (call - 1).min(responses.len().saturating_sub(1));
        let content = responses.get(idx).cloned().unwrap_or_else(|| "[]".to_string());

        Ok(VisionResponse {
            content,
            finish_reason: Some("stop".to_string()),
            usage: VisionUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
        })
    }

    fn model(&self) -> &str {
        "mock-vision"
    }
}

// =============================================================================
// Mock Object Store
// =============================================================================

/// An upload captured by [`MockObjectStore`].
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Object store that records uploads, optionally failing every write.
pub struct MockObjectStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    failure: Option<String>,
}

impl MockObjectStore {
    /// Create a store that accepts every upload.
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Create a store that rejects every upload with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// Uploads received so far.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::upload(message.clone()));
        }
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.test/analyzed_images/{}", key)
    }
}

// =============================================================================
// Mock Repository
// =============================================================================

/// Repository that records inserts, optionally failing every write.
pub struct MockAnalysisRepository {
    records: Mutex<Vec<AnalysisRecord>>,
    failure: Option<String>,
}

impl MockAnalysisRepository {
    /// Create a repository that accepts every insert.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Create a repository that rejects every insert with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// Records inserted so far.
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MockAnalysisRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisRepository for MockAnalysisRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::persistence(message.clone()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
