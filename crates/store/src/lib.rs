#![deny(unused)]
//! Object storage and persistence backends for WordLens.
//!
//! Uploaded images go to an [`ObjectStore`] (in-memory or S3) under a
//! collision-resistant key; analysis results optionally go to an
//! [`AnalysisRepository`] (in-memory or SQLite).

pub mod memory;
pub mod s3;
pub mod sqlite;

use std::sync::Arc;

use wordlens_core::{
    config::{PersistenceConfig, StorageBackend, StorageConfig},
    traits::{AnalysisRepository, ObjectStore},
    Error, Result,
};

pub use memory::{InMemoryAnalysisRepository, InMemoryObjectStore};
pub use s3::S3ObjectStore;
pub use sqlite::{SqliteAnalysisRepository, SqliteSchema};

/// Longest file-name suffix kept in a generated key.
const MAX_FILE_NAME_LEN: usize = 100;

/// Generate a unique storage key: random UUID plus the original file name.
///
/// Path separators and characters outside `[A-Za-z0-9._-]` are replaced so
/// the key is a single, URL-safe path segment. Two calls with the same name
/// never produce the same key.
pub fn object_key(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LEN)
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        sanitized = "image".to_string();
    }

    format!("{}-{}", uuid::Uuid::new_v4(), sanitized)
}

/// Build the configured object store.
pub async fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Memory => {
            let base = config
                .public_base_url
                .clone()
                .unwrap_or_else(|| "memory://analyzed_images".to_string());
            tracing::info!(base_url = %base, "Initializing In-Memory Object Store");
            Ok(Arc::new(InMemoryObjectStore::new(base)))
        }
        StorageBackend::S3 => {
            let bucket = config
                .bucket
                .as_deref()
                .ok_or_else(|| Error::config("storage.bucket is required for the s3 backend"))?;
            tracing::info!(bucket = %bucket, endpoint = ?config.endpoint, "Initializing S3 Object Store");
            let store = S3ObjectStore::new(
                bucket,
                &config.prefix,
                config.endpoint.as_deref(),
                config.public_base_url.as_deref(),
            )
            .await;
            Ok(Arc::new(store))
        }
    }
}

/// Build the configured repository, `None` when persistence is off.
pub fn build_repository(config: &PersistenceConfig) -> Result<Option<Arc<dyn AnalysisRepository>>> {
    let Some(schema) = SqliteSchema::for_mode(config.mode) else {
        tracing::info!("Persistence disabled");
        return Ok(None);
    };

    let repo = match &config.sqlite_path {
        Some(path) => {
            tracing::info!(path = %path, schema = ?schema, "Opening SQLite analysis repository");
            SqliteAnalysisRepository::new(path, schema)?
        }
        None => {
            tracing::warn!(schema = ?schema, "No sqlite_path configured, results kept in memory only");
            SqliteAnalysisRepository::open_in_memory(schema)?
        }
    };

    Ok(Some(Arc::new(repo)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlens_core::config::PersistenceMode;

    #[test]
    fn test_object_key_keeps_file_name() {
        let key = object_key("cat.png");
        assert!(key.ends_with("-cat.png"));
        // uuid (36) + '-' + name
        assert_eq!(key.len(), 36 + 1 + "cat.png".len());
    }

    #[test]
    fn test_object_key_is_unique() {
        assert_ne!(object_key("cat.png"), object_key("cat.png"));
    }

    #[test]
    fn test_object_key_sanitizes() {
        let key = object_key("../../etc/my photo (1).jpg");
        assert!(key.ends_with("-my_photo__1_.jpg"));
        assert!(!key.contains('/'));

        assert!(object_key("").ends_with("-image"));
        assert!(object_key("..").ends_with("-image"));
    }

    #[tokio::test]
    async fn test_build_memory_store() {
        let config = StorageConfig {
            public_base_url: Some("http://localhost/files".into()),
            ..Default::default()
        };
        let store = build_object_store(&config).await.unwrap();
        assert_eq!(store.public_url("k.png"), "http://localhost/files/k.png");
    }

    #[tokio::test]
    async fn test_build_s3_store_requires_bucket() {
        let config = StorageConfig {
            backend: StorageBackend::S3,
            ..Default::default()
        };
        assert!(matches!(build_object_store(&config).await, Err(Error::Config(_))));
    }

    #[test]
    fn test_build_repository_disabled() {
        let config = PersistenceConfig {
            mode: PersistenceMode::None,
            sqlite_path: None,
        };
        assert!(build_repository(&config).unwrap().is_none());
    }
}
