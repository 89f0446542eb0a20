//! Error types for WordLens.

use thiserror::Error;

/// Result type alias using WordLens's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for WordLens.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Client Errors
    // =========================================================================
    #[error("Invalid file type: {0}. Please upload an image file.")]
    InvalidFileType(String),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Error body returned by the analysis endpoint.
    #[error("{0}")]
    Service(String),

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("Failed to upload image: {0}")]
    UploadFailure(String),

    #[error("Failed to persist analysis: {0}")]
    PersistenceFailure(String),

    // =========================================================================
    // Model Gateway Errors
    // =========================================================================
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    #[error("Could not parse model response: {0}")]
    ResponseParseFailure(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a malformed request error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create an upload error.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::UploadFailure(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceFailure(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Pipeline stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::MalformedRequest(_) => Some("request"),
            Self::UploadFailure(_) => Some("upload"),
            Self::InferenceFailure(_) | Self::Timeout(_) => Some("inference"),
            Self::PersistenceFailure(_) => Some("persistence"),
            _ => None,
        }
    }

    /// Whether the caller sent something the server cannot accept.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedRequest(_) | Self::InvalidFileType(_))
    }
}
