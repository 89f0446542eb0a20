//! In-memory object store and repository implementations.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::RwLock;

use wordlens_core::{
    traits::{AnalysisRepository, ObjectStore},
    types::AnalysisRecord,
    Result,
};

/// Stored object with metadata.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// The actual data.
    pub data: Bytes,
    /// Content type.
    pub content_type: String,
    /// Creation timestamp.
    pub created_at: i64,
}

/// In-memory object store using DashMap for concurrent access.
///
/// Serves development setups and tests; URLs point at `base_url`.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, StoredBlob>,
    base_url: String,
}

impl InMemoryObjectStore {
    /// Create a new in-memory store whose public URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a stored object.
    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.objects.get(key).map(|r| r.value().clone())
    }

    /// Get the number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://analyzed_images")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        tracing::trace!(
            key = key,
            size = data.len(),
            content_type = content_type,
            "Storing object in memory"
        );

        self.objects.insert(
            key.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
                created_at: chrono::Utc::now().timestamp(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// In-memory repository keeping every inserted record.
#[derive(Default)]
pub struct InMemoryAnalysisRepository {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl InMemoryAnalysisRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records inserted so far.
    pub async fn records(&self) -> Vec<AnalysisRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    async fn insert(&self, record: &AnalysisRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlens_core::types::AnalysisResult;

    #[tokio::test]
    async fn test_upload_and_get() {
        let store = InMemoryObjectStore::default();

        let data = Bytes::from_static(b"\x89PNG");
        store.upload("abc-cat.png", data.clone(), "image/png").await.unwrap();

        let blob = store.get("abc-cat.png").unwrap();
        assert_eq!(blob.data, data);
        assert_eq!(blob.content_type, "image/png");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_public_url_trims_trailing_slash() {
        let store = InMemoryObjectStore::new("http://localhost:3000/files/");
        assert_eq!(store.public_url("k.png"), "http://localhost:3000/files/k.png");
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = InMemoryObjectStore::default();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_repository_keeps_insert_order() {
        let repo = InMemoryAnalysisRepository::new();
        let first = AnalysisRecord::Words(vec![AnalysisResult::new("cat", "d", "s")]);
        let second = AnalysisRecord::Image {
            image_path: "k.png".into(),
            analysis: Vec::new(),
        };

        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        assert_eq!(repo.records().await, vec![first, second]);
    }
}
