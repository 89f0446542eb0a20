use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::AnalysisResult;

// =============================================================================
// Image Input
// =============================================================================

/// Where the image to analyze comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Already uploaded; the model fetches it by URL.
    Url(String),
    /// Raw file received by the service, uploaded before inference.
    Upload(ImageUpload),
}

/// A file payload together with its declared metadata.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name as sent by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

impl ImageUpload {
    /// Create a new upload payload.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Whether the declared content type indicates an image.
    pub fn is_image(&self) -> bool {
        is_image_content_type(&self.content_type)
    }
}

/// Whether a declared MIME type indicates an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Location of an object after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Storage key.
    pub key: String,
    /// Publicly resolvable URL.
    pub public_url: String,
}

// =============================================================================
// Persistence Records
// =============================================================================

/// A persisted analysis, in one of the two supported schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRecord {
    /// One row per identified word.
    Words(Vec<AnalysisResult>),
    /// One row per image with the full list embedded.
    Image {
        /// Storage key or URL of the analyzed image.
        image_path: String,
        /// The full result list.
        analysis: Vec<AnalysisResult>,
    },
}

impl AnalysisRecord {
    /// Number of analysis items carried by the record.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Words(items) => items.len(),
            Self::Image { analysis, .. } => analysis.len(),
        }
    }
}
