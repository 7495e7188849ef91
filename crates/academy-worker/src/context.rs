//! Wiring shared by the CLI, the job handlers and the daemon.

use std::sync::Arc;

use academy_core::config::AppConfig;
use academy_core::result::AppResult;
use academy_core::traits::{Clock, EventPublisher, SweepLock, SystemClock};
use academy_database::traits::{
    DispatchLog, JobRepository, NotificationRepository, RecordingRepository,
    ScheduleTemplateRepository, SessionRepository, StudentDirectory, SubscriptionRepository,
};
use academy_database::{DatabasePool, PgAdvisoryLock, PgEventPublisher};
use academy_entity::session::SessionKind;
use academy_service::meeting::{
    HttpMeetingClient, LocalRoomProvider, MeetingProvider, RecordingRegistry,
};
use academy_service::notification::{DbNotificationDispatcher, NotificationDispatcher, NotificationService};
use academy_service::session::{SessionGenerator, SessionPreparer};
use academy_service::subscription::GraceService;

use crate::lifecycle::{LifecycleEvaluator, LifecycleSweeper, TransitionExecutor};
use crate::recording::RecordingSweep;

/// Every collaborator the sweeps need, behind trait objects.
#[derive(Clone)]
pub struct SchedulerContext {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Source of `as_of` for CLI and worker runs.
    pub clock: Arc<dyn Clock>,
    /// Sweep overlap lock.
    pub lock: Arc<dyn SweepLock>,
    /// Domain event sink.
    pub events: Arc<dyn EventPublisher>,
    /// Subscriptions.
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Students and guardians.
    pub students: Arc<dyn StudentDirectory>,
    /// Reminder dedup log.
    pub dispatch_log: Arc<dyn DispatchLog>,
    /// In-app notifications.
    pub notifications: Arc<dyn NotificationRepository>,
    /// Sessions.
    pub sessions: Arc<dyn SessionRepository>,
    /// Recordings.
    pub recordings: Arc<dyn RecordingRepository>,
    /// Schedule templates.
    pub templates: Arc<dyn ScheduleTemplateRepository>,
    /// Job queue.
    pub jobs: Arc<dyn JobRepository>,
    /// Notification delivery.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// Meeting rooms.
    pub meetings: Arc<dyn MeetingProvider>,
    /// Recording handlers per session kind.
    pub recording_handlers: RecordingRegistry,
}

impl SchedulerContext {
    /// Wire PostgreSQL repositories and the configured meeting provider.
    pub fn from_database(db: &DatabasePool, config: AppConfig) -> AppResult<Self> {
        let repos = db.repositories();
        let notifications: Arc<dyn NotificationRepository> = Arc::new(repos.notifications);

        let (meetings, recording_handlers): (Arc<dyn MeetingProvider>, RecordingRegistry) =
            if config.meetings.enabled {
                let client = Arc::new(HttpMeetingClient::new(
                    &config.meetings,
                    config.sessions.default_duration_minutes,
                )?);
                let registry = RecordingRegistry::new()
                    .with(SessionKind::Quran, client.clone())
                    .with(SessionKind::Academic, client.clone());
                (client, registry)
            } else {
                (Arc::new(LocalRoomProvider), RecordingRegistry::new())
            };

        Ok(Self {
            clock: Arc::new(SystemClock),
            lock: Arc::new(PgAdvisoryLock::new(db.pool().clone())),
            events: Arc::new(PgEventPublisher::new(db.pool().clone())),
            subscriptions: Arc::new(repos.subscriptions),
            students: Arc::new(repos.students),
            dispatch_log: Arc::new(repos.dispatch_log),
            dispatcher: Arc::new(DbNotificationDispatcher::new(notifications.clone())),
            notifications,
            sessions: Arc::new(repos.sessions),
            recordings: Arc::new(repos.recordings),
            templates: Arc::new(repos.templates),
            jobs: Arc::new(repos.jobs),
            meetings,
            recording_handlers,
            config,
        })
    }

    /// Subscription lifecycle sweeper.
    pub fn lifecycle_sweeper(&self) -> LifecycleSweeper {
        let evaluator = LifecycleEvaluator::new(
            self.subscriptions.clone(),
            self.students.clone(),
            self.dispatch_log.clone(),
            self.config.lifecycle.clone(),
        );
        let executor = TransitionExecutor::new(
            self.subscriptions.clone(),
            self.dispatch_log.clone(),
            self.dispatcher.clone(),
            self.events.clone(),
            self.config.lifecycle.clone(),
        );
        LifecycleSweeper::new(evaluator, executor, self.lock.clone(), self.events.clone())
    }

    /// Recording stop sweep.
    pub fn recording_sweep(&self) -> RecordingSweep {
        RecordingSweep::new(
            self.recordings.clone(),
            self.recording_handlers.clone(),
            self.events.clone(),
            self.config.sessions.default_duration_minutes,
        )
    }

    /// Session generator.
    pub fn session_generator(&self) -> SessionGenerator {
        SessionGenerator::new(
            self.templates.clone(),
            self.sessions.clone(),
            self.subscriptions.clone(),
            self.events.clone(),
        )
    }

    /// Session preparer.
    pub fn session_preparer(&self) -> SessionPreparer {
        SessionPreparer::new(
            self.sessions.clone(),
            self.meetings.clone(),
            self.events.clone(),
            self.config.sessions.prepare_window_minutes,
        )
    }

    /// Grace period service.
    pub fn grace_service(&self) -> GraceService {
        GraceService::new(self.subscriptions.clone(), self.events.clone())
    }

    /// Notification housekeeping.
    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.notifications.clone())
    }
}

impl std::fmt::Debug for SchedulerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerContext")
            .field("clock", &self.clock)
            .field("lock", &self.lock)
            .field("recording_handlers", &self.recording_handlers)
            .finish_non_exhaustive()
    }
}
