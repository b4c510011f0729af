//! Stats recompute job handler.

use async_trait::async_trait;
use tracing::debug;

use resumevault_entity::job::{JOB_TYPE_STATS_RECOMPUTE, Job, JobPayload};
use resumevault_service::StatsService;

use crate::executor::{JobExecutionError, JobHandler, decode_payload};

/// Recomputes one resume's aggregate from its full access log.
#[derive(Debug)]
pub struct StatsRecomputeJobHandler {
    stats: StatsService,
}

impl StatsRecomputeJobHandler {
    pub fn new(stats: StatsService) -> Self {
        Self { stats }
    }
}

#[async_trait]
impl JobHandler for StatsRecomputeJobHandler {
    fn job_type(&self) -> &str {
        JOB_TYPE_STATS_RECOMPUTE
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let JobPayload::StatsRecompute { resume_id } = decode_payload(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} is not a stats recompute",
                job.id
            )));
        };

        if self.stats.recompute(resume_id).await?.is_none() {
            debug!(job_id = %job.id, resume_id = %resume_id, "Resume deleted; nothing to recompute");
        }
        Ok(())
    }
}
