//! Job queue abstraction for enqueuing and dequeuing sweep jobs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing;

use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_core::types::id::JobId;
use academy_database::traits::{JobRepository, QueueStats};
use academy_entity::job::{Job, JobPayload, JobPriority, JobStatus};

/// Job queue for enqueuing and dequeuing work
#[derive(Clone)]
pub struct JobQueue {
    /// Job persistence
    repo: Arc<dyn JobRepository>,
    /// Worker identifier for claiming jobs
    worker_id: String,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("worker_id", &self.worker_id)
            .finish()
    }
}

impl JobQueue {
    /// Create a new job queue
    pub fn new(repo: Arc<dyn JobRepository>, worker_id: impl Into<String>) -> Self {
        Self {
            repo,
            worker_id: worker_id.into(),
        }
    }

    /// This worker's identifier.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Enqueue a typed payload
    pub async fn enqueue(&self, payload: JobPayload, priority: JobPriority) -> AppResult<Job> {
        payload.validate()?;
        let params = payload.into_create_job(priority)?;
        let job = self.repo.enqueue(params).await?;

        tracing::debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            queue = %job.queue,
            priority = %job.priority,
            "Enqueued job"
        );

        Ok(job)
    }

    /// Dequeue the next available job from the given queues, in order
    pub async fn dequeue(&self, queues: &[&str]) -> AppResult<Option<Job>> {
        for queue in queues {
            if let Some(job) = self.repo.dequeue(queue, &self.worker_id).await? {
                tracing::debug!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    queue = %job.queue,
                    "Dequeued job"
                );
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    /// Mark a job as completed successfully
    pub async fn complete(&self, job_id: JobId, result: &serde_json::Value) -> AppResult<()> {
        self.repo.complete(job_id, result).await?;
        tracing::debug!(%job_id, "Job completed");
        Ok(())
    }

    /// Mark a job as failed for good
    pub async fn fail(&self, job_id: JobId, error: &str) -> AppResult<()> {
        self.repo.fail(job_id, error).await?;
        tracing::debug!(%job_id, error, "Job failed");
        Ok(())
    }

    /// Put a job back for another attempt at `retry_at`
    pub async fn retry(&self, job_id: JobId, error: &str, retry_at: DateTime<Utc>) -> AppResult<()> {
        self.repo.reschedule(job_id, error, retry_at).await?;
        tracing::debug!(%job_id, %retry_at, "Job rescheduled");
        Ok(())
    }

    /// Most recent jobs
    pub async fn recent(&self, status: Option<JobStatus>, limit: i64) -> AppResult<Vec<Job>> {
        if limit <= 0 {
            return Err(AppError::validation("limit must be positive"));
        }
        self.repo.recent(status, limit).await
    }

    /// Get queue statistics
    pub async fn stats(&self, queue: &str) -> AppResult<QueueStats> {
        self.repo.stats(queue).await
    }
}
