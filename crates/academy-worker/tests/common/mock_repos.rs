//! In-memory repositories and collaborators for sweep tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::{DashMap, DashSet};
use sqlx::types::Json;

use academy_core::error::AppError;
use academy_core::events::DomainEvent;
use academy_core::result::AppResult;
use academy_core::traits::EventPublisher;
use academy_core::types::{
    AcademyId, GuardianId, JobId, NotificationId, RecordingId, SessionId, StudentId,
    SubscriptionId, TemplateId, UserId,
};
use academy_database::traits::{
    ActiveRecording, DispatchLog, JobRepository, NotificationRepository, QueueStats,
    RecordingRepository, ScheduleTemplateRepository, SessionRepository, StatusChange,
    StudentDirectory, SubscriptionRepository,
};
use academy_entity::job::{CreateJob, Job, JobStatus};
use academy_entity::notification::{CreateNotification, DispatchKey, Notification};
use academy_entity::session::{
    NewSession, Recording, RecordingStatus, ScheduleTemplate, Session, SessionKind, SessionStatus,
};
use academy_entity::student::{Guardian, Student, StudentContact};
use academy_entity::subscription::{
    Subscription, SubscriptionKind, SubscriptionMetadata, SubscriptionStatus,
};
use academy_service::meeting::{MeetingProvider, RecordingCapable};
use academy_service::notification::{NotificationDispatcher, OutgoingNotification};

/// Fixed reference instant used across tests
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

fn db_error(what: &str) -> AppError {
    AppError::database(format!("simulated failure: {what}"))
}

// ── Subscriptions ────────────────────────────────────────────────────

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<SubscriptionId, Subscription>>,
    fail_writes: Arc<DashSet<SubscriptionId>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subscription directly
    pub fn insert(&self, sub: Subscription) {
        self.subs.insert(sub.id, sub);
    }

    /// Current state of a subscription
    pub fn get(&self, id: SubscriptionId) -> Subscription {
        self.subs.get(&id).map(|r| r.value().clone()).unwrap()
    }

    /// Overwrite the status, as another writer would
    pub fn set_status(&self, id: SubscriptionId, status: SubscriptionStatus) {
        if let Some(mut sub) = self.subs.get_mut(&id) {
            sub.status = status;
        }
    }

    /// Make every write to `id` fail with a database error
    pub fn fail_writes_for(&self, id: SubscriptionId) {
        self.fail_writes.insert(id);
    }

    /// Build a subscription owned by `student_id`
    pub fn subscription(
        student_id: StudentId,
        kind: SubscriptionKind,
        status: SubscriptionStatus,
        end_date: DateTime<Utc>,
    ) -> Subscription {
        let created = t0() - Duration::days(60);
        Subscription {
            id: SubscriptionId::new(),
            academy_id: AcademyId::new(),
            kind,
            student_id,
            package_name: "Weekly Hifz".to_string(),
            status,
            end_date,
            metadata: Json(SubscriptionMetadata::default()),
            cancelled_at: None,
            cancellation_reason: None,
            suspended_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn sorted_by<K: Ord>(
        &self,
        filter: impl Fn(&Subscription) -> bool,
        key: impl Fn(&Subscription) -> K,
    ) -> Vec<Subscription> {
        let mut rows: Vec<Subscription> = self
            .subs
            .iter()
            .filter(|r| filter(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|s| (key(s), s.id));
        rows
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> AppResult<Option<Subscription>> {
        Ok(self.subs.get(&id).map(|r| r.value().clone()))
    }

    async fn find_active_ending_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        Ok(self.sorted_by(|s| s.is_active_ending_between(start, end), |s| s.end_date))
    }

    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        Ok(self.sorted_by(
            |s| s.status == SubscriptionStatus::Pending && s.created_at < cutoff,
            |s| s.created_at,
        ))
    }

    async fn find_active_with_grace_before(
        &self,
        as_of: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        Ok(self.sorted_by(|s| s.is_grace_expired(as_of), |s| s.grace_period_ends_at()))
    }

    async fn transition(
        &self,
        id: SubscriptionId,
        expected: SubscriptionStatus,
        change: StatusChange,
    ) -> AppResult<bool> {
        if self.fail_writes.contains(&id) {
            return Err(db_error("transition"));
        }
        let Some(mut sub) = self.subs.get_mut(&id) else {
            return Ok(false);
        };
        if sub.status != expected {
            return Ok(false);
        }
        if change.clear_grace && sub.metadata.grace_period_ends_at.is_none() {
            return Ok(false);
        }

        sub.status = change.target;
        sub.updated_at = change.at;
        match change.target {
            SubscriptionStatus::Cancelled => {
                sub.cancelled_at = Some(change.at);
                if change.reason.is_some() {
                    sub.cancellation_reason = change.reason;
                }
            }
            SubscriptionStatus::Suspended => sub.suspended_at = Some(change.at),
            _ => {}
        }
        if change.clear_grace {
            sub.metadata.clear_grace();
        }
        Ok(true)
    }

    async fn grant_grace(&self, id: SubscriptionId, until: DateTime<Utc>) -> AppResult<bool> {
        if self.fail_writes.contains(&id) {
            return Err(db_error("grant_grace"));
        }
        let Some(mut sub) = self.subs.get_mut(&id) else {
            return Ok(false);
        };
        if sub.status != SubscriptionStatus::Active {
            return Ok(false);
        }
        Ok(sub.metadata.grant_grace(until).is_ok())
    }
}

// ── Students ─────────────────────────────────────────────────────────

/// In-memory student and guardian directory
#[derive(Default, Clone)]
pub struct MockStudentDirectory {
    contacts: Arc<DashMap<StudentId, StudentContact>>,
}

impl MockStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a student, optionally with a guardian
    pub fn add_student(&self, name: &str, with_guardian: bool) -> StudentContact {
        let guardian = with_guardian.then(|| Guardian {
            id: GuardianId::new(),
            user_id: UserId::new(),
            full_name: format!("Parent of {name}"),
        });
        let contact = StudentContact {
            student: Student {
                id: StudentId::new(),
                academy_id: AcademyId::new(),
                user_id: UserId::new(),
                full_name: name.to_string(),
                guardian_id: guardian.as_ref().map(|g| g.id),
                created_at: t0() - Duration::days(365),
            },
            guardian,
        };
        self.contacts.insert(contact.student.id, contact.clone());
        contact
    }

    /// Look up a contact added earlier
    pub fn contact(&self, student_id: StudentId) -> StudentContact {
        self.contacts.get(&student_id).map(|r| r.value().clone()).unwrap()
    }
}

#[async_trait]
impl StudentDirectory for MockStudentDirectory {
    async fn find_contact(&self, student_id: StudentId) -> AppResult<Option<StudentContact>> {
        Ok(self.contacts.get(&student_id).map(|r| r.value().clone()))
    }
}

// ── Dispatch log ─────────────────────────────────────────────────────

/// In-memory reminder dedup log
#[derive(Default, Clone)]
pub struct MockDispatchLog {
    sent: Arc<DashMap<DispatchKey, DateTime<Utc>>>,
}

impl MockDispatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.sent.contains_key(key)
    }
}

#[async_trait]
impl DispatchLog for MockDispatchLog {
    async fn was_sent(&self, key: &DispatchKey) -> AppResult<bool> {
        Ok(self.sent.contains_key(key))
    }

    async fn claim(&self, key: &DispatchKey, at: DateTime<Utc>) -> AppResult<bool> {
        Ok(match self.sent.entry(*key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(at);
                true
            }
        })
    }

    async fn release(&self, key: &DispatchKey) -> AppResult<()> {
        self.sent.remove(key);
        Ok(())
    }
}

// ── Notifications ────────────────────────────────────────────────────

/// In-memory notification table
#[derive(Default, Clone)]
pub struct MockNotificationRepository {
    rows: Arc<DashMap<NotificationId, Notification>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a notification created at `created_at`
    pub fn insert_at(&self, created_at: DateTime<Utc>) {
        let id = NotificationId::new();
        self.rows.insert(
            id,
            Notification {
                id,
                user_id: UserId::new(),
                notification_type: academy_entity::notification::NotificationType::SubscriptionCancelled,
                title: "Subscription cancelled".to_string(),
                message: String::new(),
                data: serde_json::json!({}),
                link: None,
                context: serde_json::json!({}),
                urgent: false,
                read_at: None,
                created_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn create(&self, data: CreateNotification) -> AppResult<Notification> {
        let row = Notification {
            id: NotificationId::new(),
            user_id: data.user_id,
            notification_type: data.notification_type,
            title: data.title,
            message: data.message,
            data: data.data,
            link: data.link,
            context: data.context,
            urgent: data.urgent,
            read_at: None,
            created_at: t0(),
        };
        self.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn purge(&self, before: Option<DateTime<Utc>>) -> AppResult<u64> {
        let before_len = self.rows.len();
        self.rows
            .retain(|_, n| before.is_some_and(|cutoff| n.created_at >= cutoff));
        Ok((before_len - self.rows.len()) as u64)
    }

    async fn count(&self, before: Option<DateTime<Utc>>) -> AppResult<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|r| before.is_none_or(|cutoff| r.created_at < cutoff))
            .count() as u64)
    }
}

// ── Sessions and recordings ──────────────────────────────────────────

/// In-memory session and recording tables
#[derive(Default, Clone)]
pub struct MockSessionRepository {
    sessions: Arc<DashMap<SessionId, Session>>,
    recordings: Arc<DashMap<RecordingId, Recording>>,
    fail_stop_marks: Arc<DashSet<RecordingId>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scheduled session
    pub fn add_session(
        &self,
        kind: SessionKind,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<i32>,
    ) -> Session {
        let session = Session {
            id: SessionId::new(),
            academy_id: AcademyId::new(),
            kind,
            subscription_id: None,
            template_id: None,
            scheduled_at,
            duration_minutes,
            status: SessionStatus::Ongoing,
            meeting_room: None,
            prepared_at: None,
            created_at: scheduled_at - Duration::days(7),
            updated_at: scheduled_at - Duration::days(7),
        };
        self.sessions.insert(session.id, session.clone());
        session
    }

    /// Start a recording on `session`
    pub fn start_recording(&self, session: &Session) -> Recording {
        let recording = Recording {
            id: RecordingId::new(),
            session_id: session.id,
            status: RecordingStatus::Recording,
            provider_ref: Some(format!("rec-{}", session.id)),
            started_at: Some(session.scheduled_at),
            stopped_at: None,
            created_at: session.scheduled_at,
        };
        self.recordings.insert(recording.id, recording.clone());
        recording
    }

    pub fn set_status(&self, id: SessionId, status: SessionStatus) {
        if let Some(mut s) = self.sessions.get_mut(&id) {
            s.status = status;
        }
    }

    pub fn session(&self, id: SessionId) -> Session {
        self.sessions.get(&id).map(|r| r.value().clone()).unwrap()
    }

    pub fn recording(&self, id: RecordingId) -> Recording {
        self.recordings.get(&id).map(|r| r.value().clone()).unwrap()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Make marking `id` stopped fail with a database error
    pub fn fail_stop_mark_for(&self, id: RecordingId) {
        self.fail_stop_marks.insert(id);
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|r| r.value().clone()))
    }

    async fn create_if_absent(&self, new: NewSession) -> AppResult<bool> {
        let exists = self.sessions.iter().any(|s| {
            new.template_id.is_some()
                && s.template_id == new.template_id
                && s.scheduled_at == new.scheduled_at
        });
        if exists {
            return Ok(false);
        }
        let session = Session {
            id: SessionId::new(),
            academy_id: new.academy_id,
            kind: new.kind,
            subscription_id: new.subscription_id,
            template_id: new.template_id,
            scheduled_at: new.scheduled_at,
            duration_minutes: new.duration_minutes,
            status: SessionStatus::Scheduled,
            meeting_room: None,
            prepared_at: None,
            created_at: t0(),
            updated_at: t0(),
        };
        self.sessions.insert(session.id, session);
        Ok(true)
    }

    async fn find_starting_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
        statuses: &[SessionStatus],
    ) -> AppResult<Vec<Session>> {
        let mut rows: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| {
                s.scheduled_at > after && s.scheduled_at <= until && statuses.contains(&s.status)
            })
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|s| (s.scheduled_at, s.id));
        Ok(rows)
    }

    async fn mark_ready(
        &self,
        id: SessionId,
        expected: SessionStatus,
        room: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut session) = self.sessions.get_mut(&id) else {
            return Ok(false);
        };
        if session.status != expected {
            return Ok(false);
        }
        session.status = SessionStatus::Ready;
        session.meeting_room = Some(room.to_string());
        session.prepared_at = Some(at);
        Ok(true)
    }
}

#[async_trait]
impl RecordingRepository for MockSessionRepository {
    async fn find_active(&self) -> AppResult<Vec<ActiveRecording>> {
        let mut rows: Vec<ActiveRecording> = self
            .recordings
            .iter()
            .filter(|r| r.is_active())
            .filter_map(|r| {
                self.sessions.get(&r.session_id).map(|s| ActiveRecording {
                    session: s.value().clone(),
                    recording: r.value().clone(),
                })
            })
            .collect();
        rows.sort_by_key(|a| (a.session.scheduled_at, a.recording.id));
        Ok(rows)
    }

    async fn mark_stopped(&self, id: RecordingId, at: DateTime<Utc>) -> AppResult<bool> {
        if self.fail_stop_marks.contains(&id) {
            return Err(db_error("mark_stopped"));
        }
        let Some(mut recording) = self.recordings.get_mut(&id) else {
            return Ok(false);
        };
        if recording.status != RecordingStatus::Recording {
            return Ok(false);
        }
        recording.status = RecordingStatus::Stopped;
        recording.stopped_at = Some(at);
        Ok(true)
    }
}

// ── Templates ────────────────────────────────────────────────────────

/// In-memory schedule templates
#[derive(Default, Clone)]
pub struct MockTemplateRepository {
    templates: Arc<DashMap<TemplateId, ScheduleTemplate>>,
}

impl MockTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: ScheduleTemplate) {
        self.templates.insert(template.id, template);
    }
}

#[async_trait]
impl ScheduleTemplateRepository for MockTemplateRepository {
    async fn find_active(&self) -> AppResult<Vec<ScheduleTemplate>> {
        let mut rows: Vec<ScheduleTemplate> = self
            .templates
            .iter()
            .filter(|t| t.is_active)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|t| t.id);
        Ok(rows)
    }
}

// ── Jobs ─────────────────────────────────────────────────────────────

/// In-memory job queue
#[derive(Default, Clone)]
pub struct MockJobRepository {
    jobs: Arc<DashMap<JobId, Job>>,
}

impl MockJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self, id: JobId) -> Job {
        self.jobs.get(&id).map(|r| r.value().clone()).unwrap()
    }
}

#[async_trait]
impl JobRepository for MockJobRepository {
    async fn enqueue(&self, data: CreateJob) -> AppResult<Job> {
        let job = Job {
            id: JobId::new(),
            job_type: data.job_type,
            queue: data.queue,
            priority: data.priority,
            payload: data.payload,
            result: None,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: data.max_attempts,
            scheduled_at: data.scheduled_at.unwrap_or_else(t0),
            started_at: None,
            completed_at: None,
            worker_id: None,
            created_at: t0(),
            updated_at: t0(),
        };
        self.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn dequeue(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        let next = self
            .jobs
            .iter()
            .filter(|j| j.queue == queue && j.status == JobStatus::Pending)
            .min_by_key(|j| (j.scheduled_at, j.created_at, j.id))
            .map(|j| j.id);
        let Some(id) = next else {
            return Ok(None);
        };
        let mut job = self.jobs.get_mut(&id).unwrap();
        job.status = JobStatus::Running;
        job.attempts += 1;
        job.worker_id = Some(worker_id.to_string());
        job.started_at = Some(t0());
        Ok(Some(job.clone()))
    }

    async fn complete(&self, id: JobId, result: &serde_json::Value) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Completed;
            job.result = Some(result.clone());
            job.completed_at = Some(t0());
        }
        Ok(())
    }

    async fn fail(&self, id: JobId, error_message: &str) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Failed;
            job.error_message = Some(error_message.to_string());
        }
        Ok(())
    }

    async fn reschedule(
        &self,
        id: JobId,
        error_message: &str,
        retry_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Pending;
            job.error_message = Some(error_message.to_string());
            job.scheduled_at = retry_at;
        }
        Ok(())
    }

    async fn recent(&self, status: Option<JobStatus>, limit: i64) -> AppResult<Vec<Job>> {
        let mut rows: Vec<Job> = self
            .jobs
            .iter()
            .filter(|j| status.is_none_or(|s| j.status == s))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|j| std::cmp::Reverse(j.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn stats(&self, queue: &str) -> AppResult<QueueStats> {
        let mut stats = QueueStats::default();
        for job in self.jobs.iter().filter(|j| j.queue == queue) {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => {}
            }
        }
        Ok(stats)
    }
}

// ── Collaborators ────────────────────────────────────────────────────

/// Records delivered notifications; can be told to fail for a user
#[derive(Default, Clone, Debug)]
pub struct MockDispatcher {
    sent: Arc<DashMap<UserId, Vec<OutgoingNotification>>>,
    fail_for: Arc<DashSet<UserId>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, user_id: UserId) {
        self.fail_for.insert(user_id);
    }

    /// Notifications delivered to `user_id`
    pub fn sent_to(&self, user_id: UserId) -> Vec<OutgoingNotification> {
        self.sent
            .get(&user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.sent.iter().map(|r| r.value().len()).sum()
    }
}

#[async_trait]
impl NotificationDispatcher for MockDispatcher {
    async fn send(&self, notification: OutgoingNotification) -> AppResult<()> {
        if self.fail_for.contains(&notification.recipient) {
            return Err(AppError::external("push gateway unavailable"));
        }
        self.sent
            .entry(notification.recipient)
            .or_default()
            .push(notification);
        Ok(())
    }
}

/// Captures published events
#[derive(Default, Clone, Debug)]
pub struct CapturingPublisher {
    events: Arc<std::sync::Mutex<Vec<DomainEvent>>>,
}

impl CapturingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.payload.event_type())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for CapturingPublisher {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Meeting provider that names rooms after the session
#[derive(Default, Clone, Debug)]
pub struct MockMeetingProvider {
    calls: Arc<AtomicUsize>,
    fail_for: Arc<DashSet<SessionId>>,
}

impl MockMeetingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, id: SessionId) {
        self.fail_for.insert(id);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeetingProvider for MockMeetingProvider {
    async fn prepare_room(&self, session: &Session) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.contains(&session.id) {
            return Err(AppError::external("room service timed out"));
        }
        Ok(format!("room-{}", session.id))
    }
}

/// Recording handler with scripted results per session
#[derive(Default, Clone, Debug)]
pub struct MockRecorder {
    calls: Arc<DashMap<SessionId, usize>>,
    nothing_running: Arc<DashSet<SessionId>>,
    fail_for: Arc<DashSet<SessionId>>,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nothing_running_for(&self, id: SessionId) {
        self.nothing_running.insert(id);
    }

    pub fn fail_for(&self, id: SessionId) {
        self.fail_for.insert(id);
    }

    pub fn calls_for(&self, id: SessionId) -> usize {
        self.calls.get(&id).map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl RecordingCapable for MockRecorder {
    async fn stop_recording(&self, session: &Session, _recording: &Recording) -> AppResult<bool> {
        *self.calls.entry(session.id).or_default() += 1;
        if self.fail_for.contains(&session.id) {
            return Err(AppError::external("recording service error"));
        }
        Ok(!self.nothing_running.contains(&session.id))
    }
}
