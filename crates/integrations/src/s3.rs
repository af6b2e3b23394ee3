//! S3 artifact storage.
//!
//! Thin wrapper over the AWS SDK for uploading result artifacts. The
//! store is built once from the ambient AWS credential chain (env vars,
//! shared config, instance profile) and reused across uploads.

use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;

/// Errors from the artifact-storage layer.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The SDK reported a failure putting the object.
    #[error("S3 upload to {bucket}/{key} failed: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Client for uploading artifacts to S3.
pub struct ArtifactStore {
    client: aws_sdk_s3::Client,
}

impl ArtifactStore {
    /// Build a store for `region` from the ambient credential chain.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
        }
    }

    /// Upload `bytes` to `bucket` under `key`.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), UploadError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| UploadError::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
