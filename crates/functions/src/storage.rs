use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use certify_common::{CertifyError, CertifyResult};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Durable object storage for rendered certificates.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads `body` under `key` with a public-read ACL, replacing any
    /// previous object at that key.
    async fn put_public(&self, key: &str, body: Vec<u8>, content_type: &str) -> CertifyResult<()>;
}

pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_public(&self, key: &str, body: Vec<u8>, content_type: &str) -> CertifyResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                CertifyError::storage(format!(
                    "put s3://{}/{} failed: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(())
    }
}

/// Derives object keys and public URLs from certificate ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    public_base_url: String,
    extension: String,
}

impl ArtifactLocator {
    pub fn new(public_base_url: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            extension: extension.into(),
        }
    }

    pub fn key(&self, id: &str) -> String {
        format!("{}.{}", id, self.extension)
    }

    pub fn url(&self, id: &str) -> String {
        format!("{}/{}", self.public_base_url, self.key(id))
    }
}
