//! The image-analysis pipeline.
//!
//! acquire image → inference call → normalize reply → persist → envelope.
//! Each step awaits the previous one; nothing is shared between calls except
//! the injected clients.

use std::sync::Arc;

use wordlens_core::{
    config::{ParseFailurePolicy, PersistenceMode},
    traits::{AnalysisRepository, ObjectStore, VisionClient},
    types::{AnalysisEnvelope, AnalysisRecord, AnalysisResult, ImageSource, ImageUpload},
    Error, Result,
};
use wordlens_model_gateway::{normalize, word_analysis_request};

/// Analysis service, constructed once per process and shared by handlers.
pub struct AnalysisService {
    vision: Arc<dyn VisionClient>,
    store: Arc<dyn ObjectStore>,
    repository: Option<Arc<dyn AnalysisRepository>>,
    persistence: PersistenceMode,
    parse_policy: ParseFailurePolicy,
}

impl AnalysisService {
    /// Create a service with persistence disabled.
    pub fn new(vision: Arc<dyn VisionClient>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            vision,
            store,
            repository: None,
            persistence: PersistenceMode::None,
            parse_policy: ParseFailurePolicy::default(),
        }
    }

    /// Persist results with the given schema.
    pub fn with_repository(mut self, repository: Arc<dyn AnalysisRepository>, mode: PersistenceMode) -> Self {
        self.persistence = mode;
        self.repository = match mode {
            PersistenceMode::None => None,
            _ => Some(repository),
        };
        self
    }

    /// Set the policy applied when the model reply cannot be parsed.
    pub fn with_parse_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Run the full pipeline for one image.
    pub async fn analyze(&self, source: ImageSource) -> Result<AnalysisEnvelope> {
        let (image_url, image_path) = match source {
            ImageSource::Url(url) => (url, None),
            ImageSource::Upload(upload) => {
                let key = self.store_upload(upload).await?;
                (self.store.public_url(&key), Some(key))
            }
        };

        tracing::info!(image_url = %image_url, model = %self.vision.model(), "Analyzing image");

        let response = self
            .vision
            .describe_image(&word_analysis_request(&image_url))
            .await
            .map_err(|e| match e {
                Error::InferenceFailure(_) | Error::Timeout(_) => e,
                other => Error::inference(other.to_string()),
            })?;

        let normalized = normalize(&response.content, self.parse_policy);
        tracing::info!(
            items = normalized.results.len(),
            degraded = normalized.degraded,
            "Model reply normalized"
        );

        let stored_path = image_path.clone().unwrap_or_else(|| image_url.clone());
        let warning = self.persist(&stored_path, &normalized.results).await?;

        Ok(AnalysisEnvelope {
            analysis: normalized.results,
            image_path,
            warning,
        })
    }

    async fn store_upload(&self, upload: ImageUpload) -> Result<String> {
        if upload.data.is_empty() {
            return Err(Error::malformed("uploaded file is empty"));
        }
        if !upload.is_image() {
            return Err(Error::malformed(format!(
                "uploaded file must be an image, got '{}'",
                upload.content_type
            )));
        }

        let key = wordlens_store::object_key(&upload.file_name);
        let size = upload.data.len();

        self.store
            .upload(&key, upload.data, &upload.content_type)
            .await
            .map_err(|e| match e {
                Error::UploadFailure(_) => e,
                other => Error::upload(other.to_string()),
            })?;

        tracing::info!(key = %key, size, "Image stored");
        Ok(key)
    }

    /// Returns a warning for non-fatal failures; per-image failures are fatal.
    async fn persist(&self, image_path: &str, results: &[AnalysisResult]) -> Result<Option<String>> {
        let Some(repository) = &self.repository else {
            return Ok(None);
        };

        let record = match self.persistence {
            PersistenceMode::None => return Ok(None),
            PersistenceMode::PerWord => AnalysisRecord::Words(results.to_vec()),
            PersistenceMode::PerImage => AnalysisRecord::Image {
                image_path: image_path.to_string(),
                analysis: results.to_vec(),
            },
        };

        match repository.insert(&record).await {
            Ok(()) => {
                tracing::debug!(items = record.item_count(), "Analysis persisted");
                Ok(None)
            }
            Err(e) if self.persistence == PersistenceMode::PerWord => {
                tracing::warn!(error = %e, "Failed to save words; returning analysis anyway");
                Ok(Some(format!("Analysis was not saved: {}", e)))
            }
            Err(e) => {
                tracing::error!(error = %e, image_path = %image_path, "Failed to save analysis");
                Err(match e {
                    Error::PersistenceFailure(_) => e,
                    other => Error::persistence(other.to_string()),
                })
            }
        }
    }
}
