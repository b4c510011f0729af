//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_core::traits::storage::{
    ContentDisposition, SignedUrl, StorageObjectMeta, StorageProvider,
};

use crate::signer::BlobSigner;

/// Local filesystem storage provider with HMAC-signed URLs.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// URL signer shared with the API's blob endpoints.
    signer: BlobSigner,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str, signer: BlobSigner) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, signer })
    }

    /// The signer verifying requests against this provider's URLs.
    pub fn signer(&self) -> &BlobSigner {
        &self.signer
    }

    /// Resolve an object key to a path within the root, rejecting traversal.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || key.is_empty() {
            return Err(AppError::invalid_input(format!("Invalid object key: '{key}'")));
        }
        Ok(self.root.join(relative))
    }

    /// Write an object (the target of a signed PUT).
    pub async fn write_object(&self, key: &str, data: Bytes) -> AppResult<u64> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.flush().await?;
        debug!(key, size = data.len(), "Wrote local object");
        Ok(data.len() as u64)
    }

    /// Read an object (the target of a signed GET).
    pub async fn read_object(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(format!("Object '{key}' not found")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn expiry(expires_in: Duration) -> AppResult<DateTime<Utc>> {
        let delta = chrono::Duration::from_std(expires_in)
            .map_err(|e| AppError::internal(format!("Invalid expiry: {e}")))?;
        Ok(Utc::now() + delta)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root).await.is_ok_and(|m| m.is_dir()))
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<SignedUrl> {
        self.resolve(key)?;
        let expires_at = Self::expiry(expires_in)?;
        let url = self
            .signer
            .sign_url(key, "PUT", expires_at, Some(content_type), None)?;
        Ok(SignedUrl {
            url,
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
        self.resolve(key)?;
        let expires_at = Self::expiry(expires_in)?;
        let header = disposition.header_value();
        let url = self
            .signer
            .sign_url(key, "GET", expires_at, None, Some(&header))?;
        Ok(SignedUrl {
            url,
            method: "GET".to_string(),
            expires_at,
        })
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let path = self.resolve(key)?;
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::not_found(format!("Object '{key}' not found")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: meta.len(),
            content_type: None,
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
