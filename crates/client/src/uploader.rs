use async_trait::async_trait;
use std::sync::Arc;

use wordlens_core::{
    config::{StorageBackend, StorageConfig},
    traits::ObjectStore,
    types::StoredObject,
    Error, Result,
};
use wordlens_store::object_key;

use crate::state::FileCandidate;

/// Puts a file in the content store before analysis.
#[async_trait]
pub trait ContentUploader: Send + Sync {
    async fn upload(&self, file: &FileCandidate) -> Result<StoredObject>;
}

/// Uploader backed by any [`ObjectStore`].
pub struct StoreUploader {
    store: Arc<dyn ObjectStore>,
}

impl StoreUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Build the configured store for a separate client process.
    ///
    /// The memory backend lives inside this process, so the analysis service
    /// could never fetch its URLs. Only shared backends are accepted.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        if config.backend == StorageBackend::Memory {
            return Err(Error::config(
                "pre-upload needs a shared object store; set storage.backend = \"s3\"",
            ));
        }
        let store = wordlens_store::build_object_store(config).await?;
        Ok(Self::new(store))
    }
}

#[async_trait]
impl ContentUploader for StoreUploader {
    async fn upload(&self, file: &FileCandidate) -> Result<StoredObject> {
        let key = object_key(&file.name);
        self.store
            .upload(&key, file.data.clone(), &file.content_type)
            .await?;

        let public_url = self.store.public_url(&key);
        tracing::info!(key = %key, url = %public_url, "Image uploaded");

        Ok(StoredObject { key, public_url })
    }
}
