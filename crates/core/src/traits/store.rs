//! Storage traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::AnalysisRecord;

/// Durable blob storage that hands out public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key`.
    ///
    /// Failures are reported as [`crate::Error::UploadFailure`].
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Public URL for `key`. Resolvable once `upload` has succeeded.
    fn public_url(&self, key: &str) -> String;
}

/// Insert-only persistence for analysis results.
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Insert one record.
    ///
    /// Failures are reported as [`crate::Error::PersistenceFailure`].
    async fn insert(&self, record: &AnalysisRecord) -> Result<()>;
}
