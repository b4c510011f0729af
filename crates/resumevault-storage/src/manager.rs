//! Storage manager: the configured provider behind a request-scoped timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use resumevault_core::config::StorageConfig;
use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_core::traits::storage::{
    ContentDisposition, SignedUrl, StorageObjectMeta, StorageProvider,
};

use crate::providers::LocalStorageProvider;
use crate::signer::BlobSigner;

/// Wraps the configured storage provider.
///
/// Every call is bounded by `storage.request_timeout_ms`; a timeout
/// surfaces as `StorageUnavailable`.
#[derive(Debug, Clone)]
pub struct StorageManager {
    inner: Arc<dyn StorageProvider>,
    local: Option<Arc<LocalStorageProvider>>,
    timeout: Duration,
}

impl StorageManager {
    /// Build the provider selected by configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        match config.provider.as_str() {
            "local" => {
                info!(root = %config.local.root_path, "Initializing local storage provider");
                let signer =
                    BlobSigner::new(&config.local.signing_secret, &config.local.public_base_url)?;
                let local =
                    Arc::new(LocalStorageProvider::new(&config.local.root_path, signer).await?);
                Ok(Self::with_local(local, timeout))
            }
            #[cfg(feature = "s3")]
            "s3" => {
                let provider = crate::providers::S3StorageProvider::new(&config.s3).await?;
                Ok(Self::from_provider(Arc::new(provider), timeout))
            }
            other => Err(AppError::configuration(format!(
                "Unknown storage provider: '{other}'. Supported: local, s3"
            ))),
        }
    }

    /// Wrap a local provider; its blobs are served by the API.
    pub fn with_local(local: Arc<LocalStorageProvider>, timeout: Duration) -> Self {
        Self {
            inner: local.clone(),
            local: Some(local),
            timeout,
        }
    }

    /// Wrap an arbitrary provider.
    pub fn from_provider(provider: Arc<dyn StorageProvider>, timeout: Duration) -> Self {
        Self {
            inner: provider,
            local: None,
            timeout,
        }
    }

    /// The local provider, when blobs are served by this process.
    pub fn local(&self) -> Option<&Arc<LocalStorageProvider>> {
        self.local.as_ref()
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Storage call timed out"
                );
                Err(AppError::storage_unavailable(format!(
                    "Storage {operation} timed out after {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl StorageProvider for StorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bounded("health_check", self.inner.health_check()).await
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<SignedUrl> {
        self.bounded(
            "presign_upload",
            self.inner.presign_upload(key, content_type, expires_in),
        )
        .await
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: &ContentDisposition,
        expires_in: Duration,
    ) -> AppResult<SignedUrl> {
        self.bounded(
            "presign_download",
            self.inner.presign_download(key, disposition, expires_in),
        )
        .await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.bounded("exists", self.inner.exists(key)).await
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        self.bounded("metadata", self.inner.metadata(key)).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.bounded("delete", self.inner.delete(key)).await
    }
}
