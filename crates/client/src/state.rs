//! Upload session state machine.

use bytes::Bytes;
use std::path::Path;

use wordlens_core::{
    types::{is_image_content_type, AnalysisResult},
    Error, Result,
};

// =============================================================================
// States
// =============================================================================

/// Lifecycle of one upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    /// Waiting for a file.
    #[default]
    Idle,
    /// Checking the selected file.
    Validating,
    /// Sending bytes to the content store.
    Uploading,
    /// Waiting for the analysis endpoint.
    Analyzing,
    /// Results are available.
    Done,
    /// The last attempt failed.
    Error,
}

impl UploadState {
    /// An analysis is in flight; new selections are rejected.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::Uploading | Self::Analyzing)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: UploadState) -> bool {
        use UploadState::*;
        matches!(
            (self, next),
            (Idle | Done | Error, Validating)
                | (Done | Error, Idle)
                | (Validating, Idle | Uploading | Analyzing)
                | (Uploading, Analyzing | Error | Idle)
                | (Analyzing, Done | Error | Idle)
        )
    }
}

// =============================================================================
// Files
// =============================================================================

/// A file selected by the user, with its declared type.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileCandidate {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk. The declared type defaults to the MIME type
    /// registered for the extension.
    pub async fn from_path(path: &Path, content_type: Option<String>) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::internal(format!("Failed to read {}: {}", path.display(), e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let content_type = content_type
            .unwrap_or_else(|| mime_guess::from_path(path).first_or_octet_stream().to_string());

        Ok(Self::new(name, content_type, data))
    }

    pub fn is_image(&self) -> bool {
        is_image_content_type(&self.content_type)
    }
}

/// How a file reached the controller.
#[derive(Debug, Clone)]
pub enum FileEvent {
    /// Drag-and-drop; only the first file is used.
    Dropped(Vec<FileCandidate>),
    /// File picker.
    Picked(FileCandidate),
}

impl FileEvent {
    pub fn into_candidate(self) -> Option<FileCandidate> {
        match self {
            Self::Dropped(files) => files.into_iter().next(),
            Self::Picked(file) => Some(file),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// What the preview shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewRef {
    /// Local file name, before anything is stored remotely.
    Local(String),
    /// Public URL or storage key.
    Remote(String),
}

/// Client-owned state for the current selection.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    pub state: UploadState,
    pub file_name: Option<String>,
    pub preview: Option<PreviewRef>,
    pub error: Option<String>,
    pub results: Vec<AnalysisResult>,
    /// Non-fatal note from the service, such as results that were not saved.
    pub warning: Option<String>,
    /// Increments on every new selection; stale completions compare against it.
    pub attempt: u64,
}

impl UploadSession {
    /// Start over for a newly selected file.
    pub(crate) fn begin(&mut self, file_name: &str) {
        self.state = UploadState::Validating;
        self.file_name = Some(file_name.to_string());
        self.preview = Some(PreviewRef::Local(file_name.to_string()));
        self.error = None;
        self.warning = None;
        self.results.clear();
        self.attempt += 1;
    }

    /// Move to `next` if the transition is legal.
    pub(crate) fn advance(&mut self, next: UploadState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}
