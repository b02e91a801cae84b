use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::BlobStore;
use crate::errors::ServiceError;

const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// S3-backed blob store.
#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket_name: String,
    // When running against LocalStack the presigned URL carries the
    // container hostname, which is not reachable from the host machine.
    localstack_hostname: Option<String>,
}

impl S3BlobStore {
    pub fn new(
        client: S3Client,
        bucket_name: impl Into<String>,
        localstack_hostname: Option<String>,
    ) -> Self {
        S3BlobStore {
            client,
            bucket_name: bucket_name.into(),
            localstack_hostname,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ServiceError::Blob(format!("failed to upload {key} to S3: {e}")))?;
        Ok(key.to_string())
    }

    async fn retrieval_url(&self, key: &str) -> Result<String, ServiceError> {
        let presigning = PresigningConfig::expires_in(PRESIGNED_URL_TTL)
            .map_err(|e| ServiceError::Blob(format!("failed to generate URL for {key}: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| ServiceError::Blob(format!("failed to generate URL for {key}: {e}")))?;

        let mut url = presigned.uri().to_string();
        if let Some(hostname) = &self.localstack_hostname {
            url = url.replace(hostname.as_str(), "localhost");
        }
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| ServiceError::Blob(format!("failed to delete {key} from S3: {e}")))?;
        Ok(())
    }
}
