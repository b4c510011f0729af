//! S3-compatible object storage provider (requires the `s3` feature).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use tracing::info;

use resumevault_core::config::storage::S3StorageConfig;
use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_core::traits::storage::{
    ContentDisposition, SignedUrl, StorageObjectMeta, StorageProvider,
};

/// S3-compatible storage provider.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 storage provider"
        );
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket is required"));
        }

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.access_key.is_empty() {
            builder = builder.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "resumevault-config",
            ));
        }
        if !config.endpoint.is_empty() {
            // Path-style addressing for MinIO and friends.
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }

    fn presigning(expires_in: Duration) -> AppResult<(PresigningConfig, DateTime<Utc>)> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::internal(format!("Invalid presign expiry: {e}")))?;
        let delta = chrono::Duration::from_std(expires_in)
            .map_err(|e| AppError::internal(format!("Invalid presign expiry: {e}")))?;
        Ok((config, Utc::now() + delta))
    }
}

fn unavailable<E>(message: &str, e: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::with_source(ErrorKind::StorageUnavailable, format!("{message}: {e}"), e)
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| true)
            .map_err(|e| unavailable("S3 head_bucket failed", e))
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<SignedUrl> {
        let (presigning, expires_at) = Self::presigning(expires_in)?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| unavailable("S3 presign put failed", e))?;
        Ok(SignedUrl {
            url: request.uri().to_string(),
            method: "PUT".to_string(),
            expires_at,
        })
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: &ContentDisposition,
        expires_in: Duration,
    ) -> AppResult<SignedUrl> {
        let (presigning, expires_at) = Self::presigning(expires_in)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(disposition.header_value())
            .presigned(presigning)
            .await
            .map_err(|e| unavailable("S3 presign get failed", e))?;
        Ok(SignedUrl {
            url: request.uri().to_string(),
            method: "GET".to_string(),
            expires_at,
        })
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(false)
            }
            Err(e) => Err(unavailable("S3 head_object failed", e)),
        }
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let output = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                return Err(AppError::not_found(format!("Object '{key}' not found")));
            }
            Err(e) => return Err(unavailable("S3 head_object failed", e)),
        };

        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            content_type: output.content_type().map(str::to_string),
            last_modified: output
                .last_modified()
                .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| unavailable("S3 delete_object failed", e))?;
        Ok(())
    }
}
