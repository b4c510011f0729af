//! Access-log retention job handler.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use resumevault_entity::job::{JOB_TYPE_RETENTION, Job, JobPayload};
use resumevault_service::RetentionService;

use crate::executor::{JobExecutionError, JobHandler, decode_payload};

/// Purges access-log rows past the retention window.
#[derive(Debug)]
pub struct RetentionJobHandler {
    retention: RetentionService,
}

impl RetentionJobHandler {
    pub fn new(retention: RetentionService) -> Self {
        Self { retention }
    }
}

#[async_trait]
impl JobHandler for RetentionJobHandler {
    fn job_type(&self) -> &str {
        JOB_TYPE_RETENTION
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let JobPayload::Retention { older_than_days } = decode_payload(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} is not a retention purge",
                job.id
            )));
        };

        let report = self.retention.purge(older_than_days, Utc::now()).await?;
        info!(
            job_id = %job.id,
            older_than_days,
            affected = report.affected_resumes.len(),
            "Retention purge finished"
        );
        Ok(())
    }
}
