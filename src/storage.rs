//! Asset storage for article images.
//!
//! Uploads go to S3, or to a local directory when `LOCAL_STORAGE_PATH` is
//! set. Either way the returned URL is the public S3 URL for the key.

use std::path::PathBuf;
use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::config::StorageConfig;
use crate::constants::BLOG_IMAGE_PREFIX;
use crate::services::error::RelayError;

#[derive(Clone)]
pub enum StorageBackend {
    Local(PathBuf),
    S3(aws_sdk_s3::Client),
}

#[derive(Clone)]
pub struct AssetStore {
    backend: Option<StorageBackend>,
    bucket: Option<String>,
    region: String,
    timeout: Duration,
}

impl AssetStore {
    pub fn new(
        backend: Option<StorageBackend>,
        bucket: Option<String>,
        region: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            bucket,
            region: region.to_string(),
            timeout,
        }
    }

    /// Local directory wins over S3; S3 needs both access keys.
    pub fn from_config(config: &StorageConfig, timeout: Duration) -> Self {
        let backend = if let Some(path) = &config.local_path {
            Some(StorageBackend::Local(path.clone()))
        } else if let (Some(key_id), Some(secret)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(key_id, secret, None, None, "relay-env");
            let s3_config = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .credentials_provider(credentials)
                .build();
            Some(StorageBackend::S3(aws_sdk_s3::Client::from_conf(s3_config)))
        } else {
            None
        };

        Self::new(backend, config.bucket.clone(), &config.region, timeout)
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Some(StorageBackend::Local(_)) => "local",
            Some(StorageBackend::S3(_)) => "s3",
            None => "none",
        }
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
    }

    /// Store PNG bytes under `key` and return the public URL. No retries.
    pub async fn upload_png(&self, key: &str, data: Bytes) -> Result<String, RelayError> {
        let bucket = self
            .bucket
            .as_deref()
            .ok_or(RelayError::NotConfigured("S3_BUCKET_NAME"))?;
        let backend = self.backend.as_ref().ok_or_else(|| {
            RelayError::storage(
                key,
                "No storage backend configured (set LOCAL_STORAGE_PATH or AWS credentials)",
            )
        })?;

        let size = data.len();
        tokio::time::timeout(self.timeout, put_object(backend, bucket, key, data))
            .await
            .map_err(|_| RelayError::storage(key, format!("timed out after {:?}", self.timeout)))??;

        tracing::info!(key, bytes = size, backend = self.backend_name(), "asset uploaded");
        Ok(self.public_url(bucket, key))
    }
}

async fn put_object(
    backend: &StorageBackend,
    bucket: &str,
    key: &str,
    data: Bytes,
) -> Result<(), RelayError> {
    match backend {
        StorageBackend::Local(root) => {
            let full_path = root.join(key);
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RelayError::storage(key, e))?;
            }
            tokio::fs::write(&full_path, &data)
                .await
                .map_err(|e| RelayError::storage(key, e))
        }
        StorageBackend::S3(client) => {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type("image/png")
                .body(ByteStream::from(data))
                .send()
                .await
                .map_err(|e| RelayError::storage(key, aws_sdk_s3::error::DisplayErrorContext(e)))?;
            Ok(())
        }
    }
}

pub fn featured_key(slug: &str) -> String {
    format!("{BLOG_IMAGE_PREFIX}/{slug}-featured.png")
}

pub fn thumbnail_key(slug: &str) -> String {
    format!("{BLOG_IMAGE_PREFIX}/{slug}-thumbnail.png")
}
