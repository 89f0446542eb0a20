//! S3 implementation of ObjectStore.

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;

use wordlens_core::{traits::ObjectStore, Error, Result};

/// S3 (or S3-compatible) storage for uploaded images.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    prefix: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store.
    ///
    /// `endpoint` targets S3-compatible services (MinIO, R2) and switches to
    /// path-style addressing. `public_base_url` overrides the URL prefix
    /// handed to the model; it defaults to the bucket's virtual-host URL.
    pub async fn new(
        bucket: &str,
        prefix: &str,
        endpoint: Option<&str>,
        public_base_url: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(endpoint.is_some())
            .build();
        let client = Client::from_conf(s3_config);

        let public_base_url = match (public_base_url, endpoint) {
            (Some(url), _) => url.to_string(),
            (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            (None, None) => format!("https://{}.s3.amazonaws.com", bucket),
        };

        Self::new_with_client(client, bucket, prefix, &public_base_url)
    }

    /// Create with custom client (for testing/custom config).
    pub fn new_with_client(client: Client, bucket: &str, prefix: &str, public_base_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = self.object_path(key);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Error::upload(format!("S3 upload error: {}", e)))?;

        tracing::info!(bucket = %self.bucket, key = %path, size, "Image uploaded to S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, self.object_path(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn offline_client() -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        Client::from_conf(config)
    }

    #[test]
    fn test_public_url_without_prefix() {
        let store = S3ObjectStore::new_with_client(
            offline_client(),
            "analyzed-images",
            "",
            "https://analyzed-images.s3.amazonaws.com/",
        );
        assert_eq!(
            store.public_url("1234-cat.png"),
            "https://analyzed-images.s3.amazonaws.com/1234-cat.png"
        );
    }

    #[test]
    fn test_public_url_with_prefix() {
        let store = S3ObjectStore::new_with_client(
            offline_client(),
            "media",
            "/uploads/",
            "https://cdn.example.com",
        );
        assert_eq!(store.public_url("k.jpg"), "https://cdn.example.com/uploads/k.jpg");
    }
}
