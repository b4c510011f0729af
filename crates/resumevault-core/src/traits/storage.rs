//! Storage provider trait for the external blob storage collaborator.
//!
//! Resume bytes never pass through the engine on the hot path: clients
//! upload and download directly against signed URLs. The engine only
//! presigns, inspects, and deletes objects.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Object key within the provider.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
}

/// A time-limited URL granting one HTTP method on one object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignedUrl {
    /// Absolute URL.
    pub url: String,
    /// HTTP method the URL is valid for (`GET` or `PUT`).
    pub method: String,
    /// Instant after which the storage backend rejects the URL.
    pub expires_at: DateTime<Utc>,
}

/// How a downloaded object should be presented by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDisposition {
    /// Render in the browser.
    Inline,
    /// Save as a file with the given name.
    Attachment {
        /// Suggested filename.
        filename: String,
    },
}

impl ContentDisposition {
    /// Value suitable for a `Content-Disposition` header.
    pub fn header_value(&self) -> String {
        match self {
            Self::Inline => "inline".to_string(),
            Self::Attachment { filename } => {
                let safe: String = filename
                    .chars()
                    .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
                    .collect();
                format!("attachment; filename=\"{safe}\"")
            }
        }
    }
}

/// Trait for blob storage backends.
///
/// Implementations exist for the local filesystem and S3-compatible
/// services.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Presign a PUT of `key` restricted to `content_type`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<SignedUrl>;

    /// Presign a GET of `key`.
    async fn presign_download(
        &self,
        key: &str,
        disposition: &ContentDisposition,
        expires_in: Duration,
    ) -> AppResult<SignedUrl>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get metadata about an object.
    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename_is_quoted_safely() {
        let disposition = ContentDisposition::Attachment {
            filename: "my \"cv\".pdf".to_string(),
        };
        assert_eq!(
            disposition.header_value(),
            "attachment; filename=\"my _cv_.pdf\""
        );
        assert_eq!(ContentDisposition::Inline.header_value(), "inline");
    }
}
