//! Runs a queued sweep through the same path the CLI uses.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use academy_entity::job::{Job, JobPayload};

use crate::context::SchedulerContext;
use crate::executor::{JobExecutionError, JobHandler};
use crate::lifecycle::RunMode;

/// Handles one job type by running its task in apply mode.
#[derive(Debug)]
pub struct SweepJobHandler {
    job_type: &'static str,
    ctx: Arc<SchedulerContext>,
}

impl SweepJobHandler {
    /// Create a handler for `job_type`
    pub fn new(job_type: &'static str, ctx: Arc<SchedulerContext>) -> Self {
        Self { job_type, ctx }
    }
}

#[async_trait]
impl JobHandler for SweepJobHandler {
    fn job_type(&self) -> &str {
        self.job_type
    }

    async fn execute(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let payload = JobPayload::from_job(&job.job_type, &job.payload).map_err(|e| {
            JobExecutionError::Permanent(format!("Invalid payload for {}: {e}", job.job_type))
        })?;
        payload.validate().map_err(|e| {
            JobExecutionError::Permanent(format!("Invalid payload for {}: {}", job.job_type, e.message))
        })?;

        let as_of = self.ctx.clock.now();
        let report = self.ctx.run_task(&payload, as_of, RunMode::Apply).await?;

        if report.has_transactional_failures() {
            tracing::warn!(job_id = %job.id, job_type = self.job_type, "Sweep hit persistence failures");
            return Err(JobExecutionError::Transient(format!(
                "{} finished with persistence failures",
                self.job_type
            )));
        }

        serde_json::to_value(&report)
            .map_err(|e| JobExecutionError::Internal(academy_core::error::AppError::from(e)))
    }
}
