//! Background job domain entities.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{CreateJob, Job};
pub use payload::{JobPayload, JOB_TYPE_RETENTION, JOB_TYPE_STATS_RECOMPUTE};
pub use status::JobStatus;
