//! PostgreSQL implementations of the repository traits.

pub mod dispatch_log;
pub mod job;
pub mod notification;
pub mod recording;
pub mod session;
pub mod student;
pub mod subscription;
pub mod template;

pub use dispatch_log::PgDispatchLog;
pub use job::PgJobRepository;
pub use notification::PgNotificationRepository;
pub use recording::PgRecordingRepository;
pub use session::PgSessionRepository;
pub use student::PgStudentDirectory;
pub use subscription::PgSubscriptionRepository;
pub use template::PgScheduleTemplateRepository;

use sqlx::PgPool;

/// Every repository over one pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Subscriptions.
    pub subscriptions: PgSubscriptionRepository,
    /// Students and guardians.
    pub students: PgStudentDirectory,
    /// Reminder dedup log.
    pub dispatch_log: PgDispatchLog,
    /// In-app notifications.
    pub notifications: PgNotificationRepository,
    /// Sessions.
    pub sessions: PgSessionRepository,
    /// Recordings.
    pub recordings: PgRecordingRepository,
    /// Schedule templates.
    pub templates: PgScheduleTemplateRepository,
    /// Job queue.
    pub jobs: PgJobRepository,
}

impl Repositories {
    /// Create all repositories from a pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            students: PgStudentDirectory::new(pool.clone()),
            dispatch_log: PgDispatchLog::new(pool.clone()),
            notifications: PgNotificationRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            recordings: PgRecordingRepository::new(pool.clone()),
            templates: PgScheduleTemplateRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool),
        }
    }
}
