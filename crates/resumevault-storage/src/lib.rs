//! # resumevault-storage
//!
//! The blob storage collaborator. Providers mint signed upload and download
//! URLs, inspect uploaded objects, and delete them; resume bytes themselves
//! flow directly between clients and the backend.
//!
//! - **local**: files under a root directory, served by the API's `/blob`
//!   endpoints behind HMAC-SHA256 signed URLs
//! - **s3**: S3-compatible presigned URLs (feature `s3`)

pub mod manager;
pub mod providers;
pub mod signer;

pub use manager::StorageManager;
pub use signer::{BlobSigner, SignedBlobRequest};
