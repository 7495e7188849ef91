//! Stops recordings that ran past their session's scheduled end.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use academy_core::events::{DomainEvent, SessionEvent};
use academy_core::result::AppResult;
use academy_core::traits::{EventPublisher, publish_or_warn};
use academy_database::traits::{ActiveRecording, RecordingRepository};
use academy_service::meeting::RecordingRegistry;

use crate::lifecycle::RunMode;

/// Lock key and command name.
pub const STOP_EXPIRED_RECORDINGS: &str = "stop-expired-recordings";

/// Outcome of one recording sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordingStopReport {
    /// Recordings past their scheduled end with a registered handler.
    pub eligible: usize,
    /// Stopped at the provider.
    pub stopped_count: usize,
    /// Provider had nothing running; marked stopped locally.
    pub nothing_to_stop: usize,
    /// Failed to stop.
    pub error_count: usize,
    /// Past their end but of a kind without recording support.
    pub unsupported: usize,
    /// Failures raised by the database.
    pub transactional: usize,
    /// Dry run; nothing was stopped.
    pub dry_run: bool,
}

impl RecordingStopReport {
    /// Whether any failure should fail the command.
    pub fn has_transactional_failures(&self) -> bool {
        self.transactional > 0
    }
}

/// Finds recordings whose `scheduled_at + duration <= as_of` and stops them.
#[derive(Clone)]
pub struct RecordingSweep {
    recordings: Arc<dyn RecordingRepository>,
    registry: RecordingRegistry,
    events: Arc<dyn EventPublisher>,
    default_duration_minutes: i64,
}

impl RecordingSweep {
    /// Creates a new recording sweep.
    pub fn new(
        recordings: Arc<dyn RecordingRepository>,
        registry: RecordingRegistry,
        events: Arc<dyn EventPublisher>,
        default_duration_minutes: i64,
    ) -> Self {
        Self {
            recordings,
            registry,
            events,
            default_duration_minutes,
        }
    }

    /// Stop every eligible recording once.
    pub async fn run(&self, as_of: DateTime<Utc>, mode: RunMode) -> AppResult<RecordingStopReport> {
        let active = self.recordings.find_active().await?;
        let mut report = RecordingStopReport {
            dry_run: !mode.is_apply(),
            ..RecordingStopReport::default()
        };

        for item in &active {
            let session = &item.session;
            if !session.has_ended(as_of, self.default_duration_minutes) {
                continue;
            }
            if self.registry.get(session.kind).is_none() {
                debug!(session_id = %session.id, kind = %session.kind, "No recording support for session kind");
                report.unsupported += 1;
                continue;
            }

            report.eligible += 1;
            if mode.is_apply() {
                self.stop_one(item, as_of, &mut report).await;
            }
        }

        info!(
            eligible = report.eligible,
            stopped = report.stopped_count,
            nothing_to_stop = report.nothing_to_stop,
            errors = report.error_count,
            dry_run = report.dry_run,
            "Recording sweep finished"
        );
        Ok(report)
    }

    async fn stop_one(&self, item: &ActiveRecording, as_of: DateTime<Utc>, report: &mut RecordingStopReport) {
        let ActiveRecording { session, recording } = item;
        let Some(handler) = self.registry.get(session.kind) else {
            return;
        };

        let stopped = match handler.stop_recording(session, recording).await {
            Ok(stopped) => stopped,
            Err(e) => {
                warn!(session_id = %session.id, recording_id = %recording.id, error = %e, "Failed to stop recording");
                report.error_count += 1;
                return;
            }
        };

        if !stopped {
            warn!(
                session_id = %session.id,
                recording_id = %recording.id,
                "Provider had no running recording, marking stopped"
            );
        }

        match self.recordings.mark_stopped(recording.id, as_of).await {
            Ok(_) if stopped => report.stopped_count += 1,
            Ok(_) => report.nothing_to_stop += 1,
            Err(e) => {
                warn!(recording_id = %recording.id, error = %e, "Failed to mark recording stopped");
                report.error_count += 1;
                if e.is_persistence() {
                    report.transactional += 1;
                }
                return;
            }
        }

        publish_or_warn(
            self.events.as_ref(),
            DomainEvent::at(
                as_of,
                SessionEvent::RecordingStopped {
                    session_id: session.id,
                    recording_id: recording.id,
                    scheduled_end: session.scheduled_end_time(self.default_duration_minutes),
                }
                .into(),
            ),
        )
        .await;
    }
}

impl std::fmt::Debug for RecordingSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSweep")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
