//! Runs any schedulable task by its job payload.

use chrono::{DateTime, Utc};
use serde::Serialize;

use academy_core::result::AppResult;
use academy_entity::job::JobPayload;
use academy_service::session::{GenerationReport, PreparationReport};

use crate::context::SchedulerContext;
use crate::lifecycle::{RunMode, Sweep, SweepReport};
use crate::lock::run_exclusive;
use crate::recording::{RecordingStopReport, STOP_EXPIRED_RECORDINGS};

/// Lock key for session generation.
pub const GENERATE_SESSIONS: &str = "generate-sessions";
/// Lock key for room preparation.
pub const PREPARE_SESSIONS: &str = "prepare-sessions";

/// Report of whichever task ran.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskReport {
    /// A subscription lifecycle sweep.
    Lifecycle(SweepReport),
    /// Session generation.
    Generation(GenerationReport),
    /// Room preparation.
    Preparation(PreparationReport),
    /// Recording stop sweep.
    Recordings(RecordingStopReport),
    /// The task's lock was busy and it did not run.
    Locked {
        /// Lock key.
        name: String,
    },
}

impl TaskReport {
    /// Whether any persistence failure happened.
    pub fn has_transactional_failures(&self) -> bool {
        match self {
            Self::Lifecycle(r) => r.has_transactional_failures(),
            Self::Generation(r) => r.has_transactional_failures(),
            Self::Preparation(r) => r.has_transactional_failures(),
            Self::Recordings(r) => r.has_transactional_failures(),
            Self::Locked { .. } => false,
        }
    }
}

impl SchedulerContext {
    /// Run the task `payload` describes at `as_of`.
    pub async fn run_task(
        &self,
        payload: &JobPayload,
        as_of: DateTime<Utc>,
        mode: RunMode,
    ) -> AppResult<TaskReport> {
        payload.validate()?;

        let report = match payload {
            JobPayload::CheckExpiringSubscriptions => {
                self.run_sweep(Sweep::ExpiringReminders, as_of, mode).await?
            }
            JobPayload::CleanupExpiredPending { hours } => {
                let timeout_hours = hours.unwrap_or(self.config.lifecycle.pending_timeout_hours);
                self.run_sweep(Sweep::PendingCleanup { timeout_hours }, as_of, mode)
                    .await?
            }
            JobPayload::SuspendExpiredGrace => {
                self.run_sweep(Sweep::GraceSuspension, as_of, mode).await?
            }
            JobPayload::GenerateSessions { weeks } => {
                let weeks = weeks.unwrap_or(self.config.sessions.generation_weeks);
                let generator = self.session_generator();
                run_exclusive(
                    self.lock.as_ref(),
                    GENERATE_SESSIONS,
                    generator.generate(as_of, weeks),
                )
                .await?
                .map(TaskReport::Generation)
                .unwrap_or_else(|| locked(GENERATE_SESSIONS))
            }
            JobPayload::PrepareSessions { force } => {
                let preparer = self.session_preparer();
                run_exclusive(
                    self.lock.as_ref(),
                    PREPARE_SESSIONS,
                    preparer.prepare(as_of, *force),
                )
                .await?
                .map(TaskReport::Preparation)
                .unwrap_or_else(|| locked(PREPARE_SESSIONS))
            }
            JobPayload::StopExpiredRecordings => {
                let sweep = self.recording_sweep();
                if mode.is_apply() {
                    run_exclusive(
                        self.lock.as_ref(),
                        STOP_EXPIRED_RECORDINGS,
                        sweep.run(as_of, mode),
                    )
                    .await?
                    .map(TaskReport::Recordings)
                    .unwrap_or_else(|| locked(STOP_EXPIRED_RECORDINGS))
                } else {
                    TaskReport::Recordings(sweep.run(as_of, mode).await?)
                }
            }
        };
        Ok(report)
    }

    async fn run_sweep(
        &self,
        sweep: Sweep,
        as_of: DateTime<Utc>,
        mode: RunMode,
    ) -> AppResult<TaskReport> {
        let report = self.lifecycle_sweeper().run(sweep, as_of, mode).await?;
        Ok(TaskReport::Lifecycle(report))
    }
}

fn locked(name: &str) -> TaskReport {
    TaskReport::Locked {
        name: name.to_string(),
    }
}
