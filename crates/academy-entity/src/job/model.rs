//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use academy_core::types::JobId;

use super::status::{JobPriority, JobStatus};

/// A row in the `jobs` queue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Handler key, e.g. `"suspend_expired_grace"`.
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Job priority.
    pub priority: JobPriority,
    /// Handler arguments.
    pub payload: serde_json::Value,
    /// Sweep report on completion.
    pub result: Option<serde_json::Value>,
    /// Last error message.
    pub error_message: Option<String>,
    /// Current job status.
    pub status: JobStatus,
    /// Attempts made so far.
    pub attempts: i32,
    /// Attempts allowed.
    pub max_attempts: i32,
    /// Earliest execution time.
    pub scheduled_at: DateTime<Utc>,
    /// When the current attempt started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker that claimed the job.
    pub worker_id: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whether another attempt is allowed after a transient failure.
    pub fn can_retry(&self) -> bool {
        !self.status.is_terminal() && self.attempts < self.max_attempts
    }
}

/// Data required to enqueue a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Handler key.
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Priority.
    pub priority: JobPriority,
    /// Handler arguments.
    pub payload: serde_json::Value,
    /// Attempts allowed.
    pub max_attempts: i32,
    /// Earliest execution time; `None` means now.
    pub scheduled_at: Option<DateTime<Utc>>,
}
