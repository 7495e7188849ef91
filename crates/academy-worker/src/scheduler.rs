//! Cron scheduler that enqueues sweep jobs on their configured schedules.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use academy_core::config::ScheduleConfig;
use academy_core::error::AppError;
use academy_entity::job::{JobPayload, JobPriority};

use crate::queue::JobQueue;

/// Cron-based scheduler for the periodic sweeps
pub struct CronScheduler {
    scheduler: JobScheduler,
    queue: Arc<JobQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

/// Each sweep with its cron expression and queue priority.
pub fn scheduled_tasks(schedule: &ScheduleConfig) -> Vec<(String, JobPayload, JobPriority)> {
    vec![
        (
            schedule.check_expiring_subscriptions.clone(),
            JobPayload::CheckExpiringSubscriptions,
            JobPriority::Normal,
        ),
        (
            schedule.cleanup_expired_pending.clone(),
            JobPayload::CleanupExpiredPending { hours: None },
            JobPriority::Low,
        ),
        (
            schedule.suspend_expired_grace.clone(),
            JobPayload::SuspendExpiredGrace,
            JobPriority::Normal,
        ),
        (
            schedule.generate_sessions.clone(),
            JobPayload::GenerateSessions { weeks: None },
            JobPriority::Low,
        ),
        (
            schedule.prepare_sessions.clone(),
            JobPayload::PrepareSessions { force: false },
            JobPriority::High,
        ),
        (
            schedule.stop_expired_recordings.clone(),
            JobPayload::StopExpiredRecordings,
            JobPriority::High,
        ),
    ]
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(queue: Arc<JobQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, queue })
    }

    /// Register every sweep from the schedule config
    pub async fn register_all(&self, schedule: &ScheduleConfig) -> Result<(), AppError> {
        for (cron, payload, priority) in scheduled_tasks(schedule) {
            self.register(&cron, payload, priority).await?;
        }

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Enqueue `payload` every time `cron` fires
    pub async fn register(
        &self,
        cron: &str,
        payload: JobPayload,
        priority: JobPriority,
    ) -> Result<(), AppError> {
        let job_type = payload.job_type();
        let queue = Arc::clone(&self.queue);
        let task = payload.clone();

        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            let payload = task.clone();
            Box::pin(async move {
                tracing::debug!(job_type = payload.job_type(), "Scheduling job");
                if let Err(e) = queue.enqueue(payload, priority).await {
                    tracing::error!(error = %e, "Failed to enqueue scheduled job");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{cron}' for {job_type}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        tracing::info!(job_type, cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_job_type_is_scheduled() {
        let tasks = scheduled_tasks(&ScheduleConfig::default());
        let mut types: Vec<&str> = tasks.iter().map(|(_, p, _)| p.job_type()).collect();
        types.sort();
        let mut known = JobPayload::known_types().to_vec();
        known.sort();
        assert_eq!(types, known);
    }
}
