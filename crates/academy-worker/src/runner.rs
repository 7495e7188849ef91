//! Worker runner: main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time;
use tracing;

use academy_core::config::WorkerConfig;
use academy_entity::job::{Job, SWEEP_QUEUE};

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Base delay before the first retry; doubles per attempt.
const RETRY_BASE_SECONDS: i64 = 30;

/// Main worker runner that polls queues and executes jobs
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
    /// Queues to poll, in priority order
    queues: Vec<String>,
}

impl WorkerRunner {
    /// Create a new worker runner polling the sweep queue
    pub fn new(queue: Arc<JobQueue>, executor: Arc<JobExecutor>, config: WorkerConfig) -> Self {
        Self {
            queue,
            executor,
            config,
            queues: vec![SWEEP_QUEUE.to_string()],
        }
    }

    /// Set the queues to poll
    pub fn with_queues(mut self, queues: Vec<String>) -> Self {
        self.queues = queues;
        self
    }

    /// Run until the cancel signal flips to `true`
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let worker_id = self.queue.worker_id().to_string();
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            worker_id = %worker_id,
            concurrency,
            poll_interval = self.config.poll_interval_seconds,
            queues = ?self.queues,
            "Worker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                _ = self.poll_and_execute(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!(worker_id = %worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(worker_id = %worker_id, "Waiting for in-flight jobs to complete");

        let wait = Duration::from_secs(self.config.shutdown_timeout_seconds);
        let permits = u32::try_from(concurrency).unwrap_or(u32::MAX);
        if time::timeout(wait, semaphore.acquire_many(permits)).await.is_err() {
            tracing::warn!(worker_id = %worker_id, "Shutdown timeout reached with jobs still running");
        }

        tracing::info!(worker_id = %worker_id, "Worker shut down complete");
    }

    /// Poll for a job and execute it if available
    async fn poll_and_execute(&self, semaphore: &Arc<tokio::sync::Semaphore>) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::trace!("All worker slots occupied, waiting...");
                return;
            }
        };

        let queue_refs: Vec<&str> = self.queues.iter().map(|s| s.as_str()).collect();

        match self.queue.dequeue(&queue_refs).await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);

                tokio::spawn(async move {
                    let _permit = permit;
                    let result = execute_isolated(executor, job.clone()).await;
                    settle(&queue, &job, result).await;
                });
            }
            Ok(None) => {
                tracing::trace!("No jobs available in queues");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to dequeue job");
            }
        }
    }
}

/// Execute `job` on its own task so a panicking handler still gets settled.
pub async fn execute_isolated(
    executor: Arc<JobExecutor>,
    job: Job,
) -> Result<serde_json::Value, JobExecutionError> {
    let job_id = job.id;
    match tokio::spawn(async move { executor.execute(&job).await }).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(%job_id, error = %e, "Job handler aborted");
            Err(JobExecutionError::Permanent(format!("Job handler aborted: {e}")))
        }
    }
}

/// Record the outcome of one execution on the job row.
pub async fn settle(
    queue: &JobQueue,
    job: &Job,
    result: Result<serde_json::Value, JobExecutionError>,
) {
    let job_id = job.id;
    match result {
        Ok(value) => {
            if let Err(e) = queue.complete(job_id, &value).await {
                tracing::error!(%job_id, error = %e, "Failed to mark job as completed");
            } else {
                tracing::info!(%job_id, job_type = %job.job_type, "Job completed successfully");
            }
        }
        Err(err) => {
            let msg = err.to_string();
            if err.is_retryable() && job.can_retry() {
                let retry_at = Utc::now() + retry_delay(job.attempts);
                tracing::warn!(%job_id, error = %msg, %retry_at, "Job failed, will retry");
                if let Err(e) = queue.retry(job_id, &msg, retry_at).await {
                    tracing::error!(%job_id, error = %e, "Failed to reschedule job");
                }
            } else {
                tracing::error!(%job_id, error = %msg, "Job failed permanently");
                if let Err(e) = queue.fail(job_id, &msg).await {
                    tracing::error!(%job_id, error = %e, "Failed to mark job as failed");
                }
            }
        }
    }
}

/// Exponential backoff: 30s, 60s, 120s, ... capped at one hour.
pub fn retry_delay(attempts: i32) -> chrono::Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 7) as u32;
    let seconds = RETRY_BASE_SECONDS.saturating_mul(1_i64 << exponent);
    chrono::Duration::seconds(seconds.min(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1), chrono::Duration::seconds(30));
        assert_eq!(retry_delay(2), chrono::Duration::seconds(60));
        assert_eq!(retry_delay(3), chrono::Duration::seconds(120));
    }

    #[test]
    fn test_retry_delay_capped() {
        assert_eq!(retry_delay(0), chrono::Duration::seconds(30));
        assert_eq!(retry_delay(50), chrono::Duration::seconds(3600));
    }
}
