//! Core traits defined in `resumevault-core` and implemented by other crates.

pub mod cache;
pub mod queue;
pub mod storage;

pub use cache::CacheProvider;
pub use queue::RecomputeQueue;
pub use storage::{ContentDisposition, SignedUrl, StorageObjectMeta, StorageProvider};
