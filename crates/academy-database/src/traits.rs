//! Repository traits.
//!
//! Sweeps, services and the worker are written against these traits so
//! they can run over PostgreSQL in production and over in-memory maps in
//! tests. Every time-based query takes its cutoff explicitly; no
//! implementation reads the wall clock to decide what is due.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use academy_core::result::AppResult;
use academy_core::types::{JobId, RecordingId, SessionId, StudentId, SubscriptionId};
use academy_entity::job::{CreateJob, Job, JobStatus};
use academy_entity::notification::{CreateNotification, DispatchKey, Notification};
use academy_entity::session::{NewSession, Recording, ScheduleTemplate, Session, SessionStatus};
use academy_entity::student::StudentContact;
use academy_entity::subscription::{Subscription, SubscriptionStatus};

/// A guarded subscription status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Status to write.
    pub target: SubscriptionStatus,
    /// Timestamp stamped on `cancelled_at` / `suspended_at`.
    pub at: DateTime<Utc>,
    /// Stored in `cancellation_reason` when cancelling.
    pub reason: Option<String>,
    /// Remove the grace deadline in the same statement. The write also
    /// requires the deadline to still be present.
    pub clear_grace: bool,
}

impl StatusChange {
    /// Cancel with a reason.
    pub fn cancel(at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            target: SubscriptionStatus::Cancelled,
            at,
            reason: Some(reason.into()),
            clear_grace: false,
        }
    }

    /// Suspend and consume the grace period.
    pub fn suspend(at: DateTime<Utc>) -> Self {
        Self {
            target: SubscriptionStatus::Suspended,
            at,
            reason: None,
            clear_grace: true,
        }
    }
}

/// Subscription reads and guarded writes.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID.
    async fn find_by_id(&self, id: SubscriptionId) -> AppResult<Option<Subscription>>;

    /// ACTIVE subscriptions with `start <= end_date < end`, ordered by
    /// `(end_date, id)`.
    async fn find_active_ending_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>>;

    /// PENDING subscriptions with `created_at < cutoff`, ordered by
    /// `(created_at, id)`.
    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>>;

    /// ACTIVE subscriptions whose grace deadline is strictly before
    /// `as_of`, ordered by `(grace deadline, id)`.
    async fn find_active_with_grace_before(
        &self,
        as_of: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>>;

    /// Apply `change` only while the row is still in `expected`.
    ///
    /// Returns `false` when no row matched, meaning another writer got
    /// there first.
    async fn transition(
        &self,
        id: SubscriptionId,
        expected: SubscriptionStatus,
        change: StatusChange,
    ) -> AppResult<bool>;

    /// Set the grace deadline on an ACTIVE subscription that has none.
    ///
    /// Returns `false` when the row is not ACTIVE or already has one.
    async fn grant_grace(&self, id: SubscriptionId, until: DateTime<Utc>) -> AppResult<bool>;
}

/// Resolves notification recipients.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Student and optional guardian, or `None` if the student is gone.
    async fn find_contact(&self, student_id: StudentId) -> AppResult<Option<StudentContact>>;
}

/// Reminder dedup records.
#[async_trait]
pub trait DispatchLog: Send + Sync {
    /// Whether a reminder was already sent for `key`.
    async fn was_sent(&self, key: &DispatchKey) -> AppResult<bool>;

    /// Atomically record `key`. Returns `false` if it was already claimed.
    async fn claim(&self, key: &DispatchKey, at: DateTime<Utc>) -> AppResult<bool>;

    /// Forget `key` after a failed delivery so the next run retries it.
    async fn release(&self, key: &DispatchKey) -> AppResult<()>;
}

/// In-app notification rows.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification.
    async fn create(&self, data: CreateNotification) -> AppResult<Notification>;

    /// Delete every notification created before `before`, or all when `None`.
    async fn purge(&self, before: Option<DateTime<Utc>>) -> AppResult<u64>;

    /// Count notifications created before `before`, or all when `None`.
    async fn count(&self, before: Option<DateTime<Utc>>) -> AppResult<u64>;
}

/// Session reads and guarded writes.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by ID.
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// Insert unless a session already exists for the same template slot.
    /// Returns `true` when a row was created.
    async fn create_if_absent(&self, session: NewSession) -> AppResult<bool>;

    /// Sessions in one of `statuses` with `after < scheduled_at <= until`,
    /// ordered by `(scheduled_at, id)`.
    async fn find_starting_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
        statuses: &[SessionStatus],
    ) -> AppResult<Vec<Session>>;

    /// Record the prepared room while the session is still in `expected`.
    async fn mark_ready(
        &self,
        id: SessionId,
        expected: SessionStatus,
        room: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// A running recording together with its session.
#[derive(Debug, Clone)]
pub struct ActiveRecording {
    /// The recorded session.
    pub session: Session,
    /// The recording in RECORDING state.
    pub recording: Recording,
}

/// Recording reads and writes.
#[async_trait]
pub trait RecordingRepository: Send + Sync {
    /// Every recording in RECORDING state with its session, ordered by
    /// `(session.scheduled_at, recording.id)`.
    async fn find_active(&self) -> AppResult<Vec<ActiveRecording>>;

    /// Mark stopped while still RECORDING.
    async fn mark_stopped(&self, id: RecordingId, at: DateTime<Utc>) -> AppResult<bool>;
}

/// Weekly schedule templates.
#[async_trait]
pub trait ScheduleTemplateRepository: Send + Sync {
    /// All active templates, ordered by ID.
    async fn find_active(&self) -> AppResult<Vec<ScheduleTemplate>>;
}

/// Per-status job counts for one queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct QueueStats {
    /// Waiting jobs.
    pub pending: u64,
    /// Claimed jobs.
    pub running: u64,
    /// Finished jobs.
    pub completed: u64,
    /// Failed jobs.
    pub failed: u64,
}

/// The `jobs` table used as a work queue.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a job.
    async fn enqueue(&self, data: CreateJob) -> AppResult<Job>;

    /// Claim the next due job on `queue` for `worker_id`.
    async fn dequeue(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>>;

    /// Store the result and mark completed.
    async fn complete(&self, id: JobId, result: &serde_json::Value) -> AppResult<()>;

    /// Mark failed for good.
    async fn fail(&self, id: JobId, error_message: &str) -> AppResult<()>;

    /// Put back to pending, due at `retry_at`.
    async fn reschedule(
        &self,
        id: JobId,
        error_message: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Most recent jobs, newest first, optionally filtered by status.
    async fn recent(&self, status: Option<JobStatus>, limit: i64) -> AppResult<Vec<Job>>;

    /// Per-status counts for `queue`.
    async fn stats(&self, queue: &str) -> AppResult<QueueStats>;
}
