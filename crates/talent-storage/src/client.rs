//! S3 client implementation.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{StorageError, StorageResult};

/// Default lifetime of presigned GET URLs (7 days, the SigV4 maximum).
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 604_800;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// AWS region
    pub region: String,
    /// Optional S3-compatible endpoint (MinIO, LocalStack, R2)
    pub endpoint_url: Option<String>,
    /// Lifetime of presigned URLs
    pub presign_ttl: Duration,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let presign_ttl = std::env::var("PRESIGNED_URL_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PRESIGN_TTL_SECS);

        Ok(Self {
            access_key_id: std::env::var("AWS_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("AWS_ACCESS_KEY not set"))?,
            secret_access_key: std::env::var("AWS_SECRET_KEY")
                .map_err(|_| StorageError::config_error("AWS_SECRET_KEY not set"))?,
            bucket_name: std::env::var("AWS_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("AWS_BUCKET_NAME not set"))?,
            region: std::env::var("AWS_REGION")
                .map_err(|_| StorageError::config_error("AWS_REGION not set"))?,
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            presign_ttl: Duration::from_secs(presign_ttl.min(DEFAULT_PRESIGN_TTL_SECS)),
        })
    }
}

/// S3 storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    region: String,
    presign_ttl: Duration,
}

impl S3Client {
    /// Create a new S3 client from configuration.
    pub fn new(config: S3Config) -> StorageResult<Self> {
        if config.bucket_name.trim().is_empty() {
            return Err(StorageError::config_error("bucket name is empty"));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "talent-env",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name,
            region: config.region,
            presign_ttl: config.presign_ttl,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(S3Config::from_env()?)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload bytes under `key`.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!(key = %key, bytes = size, "Uploaded object");
        Ok(())
    }

    /// Presigned GET URL using the configured lifetime.
    pub async fn presign(&self, key: &str) -> StorageResult<String> {
        self.presign_get(key, self.presign_ttl).await
    }

    /// Generate a presigned URL for GET.
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        Ok(())
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(HeadObjectError::is_not_found) => Ok(false),
            Err(e) => Err(StorageError::AwsSdk(format!(
                "head_object failed for {}: {}",
                key,
                aws_sdk_s3::error::DisplayErrorContext(&e)
            ))),
        }
    }

    /// Check connectivity to S3 by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("S3 connectivity check failed: {}", e)))?;
        Ok(())
    }

    /// Virtual-hosted public URL of an object.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket,
            self.region,
            key.trim_start_matches('/')
        )
    }

    /// Recover an object key from a stored value.
    ///
    /// Accepts bare keys, virtual-hosted URLs of this bucket, and
    /// path-style URLs (`/{bucket}/{key}`). Query strings are dropped.
    pub fn key_from_url(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let Ok(url) = Url::parse(value) else {
            return Some(value.trim_start_matches('/').to_string());
        };

        let path = urlencoding::decode(url.path()).ok()?.into_owned();
        let path = path.trim_start_matches('/');
        let host = url.host_str().unwrap_or_default();

        let key = if host.starts_with(&format!("{}.", self.bucket)) {
            path.to_string()
        } else {
            path.strip_prefix(&format!("{}/", self.bucket))?.to_string()
        };
        (!key.is_empty()).then_some(key)
    }
}
