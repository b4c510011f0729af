//! Seam between request handling and the background stats worker.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Accepts stats recompute requests.
///
/// Implementations must coalesce: while a recompute for a resume is pending,
/// further requests for the same resume are absorbed.
#[async_trait]
pub trait RecomputeQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Request that the stats snapshot for `resume_id` be rebuilt.
    async fn enqueue_recompute(&self, resume_id: Uuid) -> AppResult<()>;
}
