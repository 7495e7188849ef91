//! Session generation, room preparation and the recording stop sweep

mod common;

use chrono::{Duration, NaiveDate, NaiveTime};

use academy_core::traits::SweepLock;
use academy_core::types::{AcademyId, TemplateId};
use academy_entity::job::JobPayload;
use academy_entity::session::{
    RecordingStatus, ScheduleTemplate, SessionKind, SessionStatus,
};
use academy_entity::subscription::{SubscriptionKind, SubscriptionStatus};
use academy_worker::task::{GENERATE_SESSIONS, TaskReport};
use academy_worker::RunMode;

use common::{Harness, MockSubscriptionRepository, t0};

/// Wednesdays at 16:00 for an active subscription ending in 60 days.
fn wednesday_template(h: &Harness) -> ScheduleTemplate {
    let contact = h.students.add_student("Zaid", false);
    let sub = MockSubscriptionRepository::subscription(
        contact.student.id,
        SubscriptionKind::Quran,
        SubscriptionStatus::Active,
        t0() + Duration::days(60),
    );
    h.subscriptions.insert(sub.clone());

    let template = ScheduleTemplate {
        id: TemplateId::new(),
        academy_id: AcademyId::new(),
        subscription_id: Some(sub.id),
        kind: SessionKind::Quran,
        weekday: 2,
        start_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        duration_minutes: 45,
        starts_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        ends_on: None,
        is_active: true,
        created_at: t0() - Duration::days(90),
    };
    h.templates.insert(template.clone());
    template
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let h = Harness::new();
    wednesday_template(&h);
    let payload = JobPayload::GenerateSessions { weeks: Some(2) };

    let first = h.ctx.run_task(&payload, t0(), RunMode::Apply).await.unwrap();
    let TaskReport::Generation(first) = first else {
        panic!("expected a generation report");
    };
    assert_eq!(first.created, 2);
    assert_eq!(h.sessions.session_count(), 2);

    let second = h.ctx.run_task(&payload, t0(), RunMode::Apply).await.unwrap();
    let TaskReport::Generation(second) = second else {
        panic!("expected a generation report");
    };
    assert_eq!(second.created, 0);
    assert_eq!(second.existing, 2);
    assert_eq!(h.sessions.session_count(), 2);
}

#[tokio::test]
async fn test_generation_stops_at_subscription_end() {
    let h = Harness::new();
    let template = wednesday_template(&h);
    let sub_id = template.subscription_id.unwrap();
    h.subscriptions.insert({
        let mut sub = h.subscriptions.get(sub_id);
        sub.end_date = t0() + Duration::days(5);
        sub
    });

    let report = h
        .ctx
        .session_generator()
        .generate(t0(), 3)
        .await
        .unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.beyond_end, 2);
}

#[tokio::test]
async fn test_generation_skips_inactive_subscription() {
    let h = Harness::new();
    let template = wednesday_template(&h);
    h.subscriptions
        .set_status(template.subscription_id.unwrap(), SubscriptionStatus::Suspended);

    let report = h.ctx.session_generator().generate(t0(), 4).await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped_templates, 1);
}

#[tokio::test]
async fn test_generation_respects_lock() {
    let h = Harness::new();
    wednesday_template(&h);
    let _lease = h.lock.try_acquire(GENERATE_SESSIONS).await.unwrap().unwrap();

    let report = h
        .ctx
        .run_task(&JobPayload::GenerateSessions { weeks: None }, t0(), RunMode::Apply)
        .await
        .unwrap();
    assert!(matches!(report, TaskReport::Locked { .. }));
    assert_eq!(h.sessions.session_count(), 0);
}

#[tokio::test]
async fn test_prepare_within_window_only() {
    let h = Harness::new();
    let soon = h
        .sessions
        .add_session(SessionKind::Academic, t0() + Duration::minutes(20), Some(60));
    let later = h
        .sessions
        .add_session(SessionKind::Academic, t0() + Duration::minutes(31), Some(60));
    h.sessions.set_status(soon.id, SessionStatus::Scheduled);
    h.sessions.set_status(later.id, SessionStatus::Scheduled);

    let report = h.ctx.session_preparer().prepare(t0(), false).await.unwrap();
    assert_eq!(report.eligible, 1);
    assert_eq!(report.prepared, 1);

    let prepared = h.sessions.session(soon.id);
    assert_eq!(prepared.status, SessionStatus::Ready);
    assert_eq!(prepared.meeting_room, Some(format!("room-{}", soon.id)));
    assert_eq!(h.sessions.session(later.id).status, SessionStatus::Scheduled);

    let again = h.ctx.session_preparer().prepare(t0(), false).await.unwrap();
    assert_eq!(again.eligible, 0);

    let forced = h.ctx.session_preparer().prepare(t0(), true).await.unwrap();
    assert_eq!(forced.prepared, 1);
    assert_eq!(h.meetings.calls(), 2);
}

#[tokio::test]
async fn test_prepare_provider_failure_is_counted() {
    let h = Harness::new();
    let broken = h
        .sessions
        .add_session(SessionKind::Quran, t0() + Duration::minutes(5), None);
    let fine = h
        .sessions
        .add_session(SessionKind::Quran, t0() + Duration::minutes(10), None);
    h.sessions.set_status(broken.id, SessionStatus::Scheduled);
    h.sessions.set_status(fine.id, SessionStatus::Scheduled);
    h.meetings.fail_for(broken.id);

    let report = h.ctx.session_preparer().prepare(t0(), false).await.unwrap();
    assert_eq!(report.prepared, 1);
    assert_eq!(report.errors, 1);
    assert!(!report.has_transactional_failures());
    assert_eq!(h.sessions.session(broken.id).status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_recording_stop_boundary() {
    let h = Harness::new();
    let ended = h
        .sessions
        .add_session(SessionKind::Quran, t0() - Duration::minutes(60), None);
    let running = h.sessions.add_session(
        SessionKind::Quran,
        t0() - Duration::minutes(60) + Duration::seconds(1),
        None,
    );
    let ended_rec = h.sessions.start_recording(&ended);
    let running_rec = h.sessions.start_recording(&running);

    let report = h.ctx.recording_sweep().run(t0(), RunMode::Apply).await.unwrap();
    assert_eq!(report.eligible, 1);
    assert_eq!(report.stopped_count, 1);

    let stopped = h.sessions.recording(ended_rec.id);
    assert_eq!(stopped.status, RecordingStatus::Stopped);
    assert_eq!(stopped.stopped_at, Some(t0()));
    assert_eq!(
        h.sessions.recording(running_rec.id).status,
        RecordingStatus::Recording
    );
    assert_eq!(h.recorder.calls_for(running.id), 0);
}

#[tokio::test]
async fn test_recording_sweep_tolerates_failures() {
    let h = Harness::new();
    let start = t0() - Duration::hours(3);
    let failing = h.sessions.add_session(SessionKind::Quran, start, Some(45));
    let idle = h.sessions.add_session(SessionKind::Academic, start, Some(45));
    let ok = h.sessions.add_session(SessionKind::Academic, start, Some(90));
    let interactive = h.sessions.add_session(SessionKind::Interactive, start, Some(30));
    for session in [&failing, &idle, &ok, &interactive] {
        h.sessions.start_recording(session);
    }
    h.recorder.fail_for(failing.id);
    h.recorder.nothing_running_for(idle.id);

    let report = h.ctx.recording_sweep().run(t0(), RunMode::Apply).await.unwrap();
    assert_eq!(report.eligible, 3);
    assert_eq!(report.stopped_count, 1);
    assert_eq!(report.nothing_to_stop, 1);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.unsupported, 1);
    assert!(!report.has_transactional_failures());

    for session in [&failing, &idle, &ok] {
        assert_eq!(h.recorder.calls_for(session.id), 1);
    }
}

#[tokio::test]
async fn test_recording_dry_run_stops_nothing() {
    let h = Harness::new();
    let session = h
        .sessions
        .add_session(SessionKind::Quran, t0() - Duration::hours(2), Some(30));
    let recording = h.sessions.start_recording(&session);

    let report = h
        .ctx
        .run_task(&JobPayload::StopExpiredRecordings, t0(), RunMode::DryRun)
        .await
        .unwrap();
    let TaskReport::Recordings(report) = report else {
        panic!("expected a recording report");
    };
    assert!(report.dry_run);
    assert_eq!(report.eligible, 1);
    assert_eq!(report.stopped_count, 0);
    assert_eq!(h.recorder.calls_for(session.id), 0);
    assert_eq!(
        h.sessions.recording(recording.id).status,
        RecordingStatus::Recording
    );
}

#[tokio::test]
async fn test_recording_mark_failure_is_transactional() {
    let h = Harness::new();
    let session = h
        .sessions
        .add_session(SessionKind::Quran, t0() - Duration::hours(2), Some(30));
    let recording = h.sessions.start_recording(&session);
    h.sessions.fail_stop_mark_for(recording.id);

    let report = h.ctx.recording_sweep().run(t0(), RunMode::Apply).await.unwrap();
    assert_eq!(report.error_count, 1);
    assert!(report.has_transactional_failures());
}
