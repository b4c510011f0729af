//! # resumevault-service
//!
//! Business logic service layer for ResumeVault. Each service orchestrates
//! repositories, the cache, the storage collaborator and the auth policy
//! to implement one use case of the access-control engine.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod access;
pub mod context;
pub mod maintenance;
pub mod resume;
pub mod share;
pub mod stats;
pub mod upload;

pub use access::{IssuedLink, LinkIssuer, LinkRequest};
pub use context::RequestContext;
pub use maintenance::{RetentionReport, RetentionService};
pub use resume::{ConfirmUpload, ResumeService};
pub use share::{CreateShareRequest, ShareService};
pub use stats::{StatsService, StatsSnapshot, compute_stats};
pub use upload::{UploadSlot, UploadTokenManager};

#[cfg(test)]
pub(crate) mod testing;
