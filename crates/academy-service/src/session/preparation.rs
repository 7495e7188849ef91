//! Prepares meeting rooms shortly before sessions start.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use academy_core::error::{AppError, ErrorKind};
use academy_core::events::{DomainEvent, SessionEvent};
use academy_core::result::AppResult;
use academy_core::traits::{EventPublisher, publish_or_warn};
use academy_database::traits::SessionRepository;
use academy_entity::session::{Session, SessionStatus};

use crate::meeting::MeetingProvider;

/// Outcome of one preparation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreparationReport {
    /// Sessions inside the window.
    pub eligible: usize,
    /// Rooms prepared.
    pub prepared: usize,
    /// Sessions whose status changed before the write.
    pub skipped: usize,
    /// Sessions that failed.
    pub errors: usize,
    /// Failures raised by the database.
    pub transactional: usize,
}

impl PreparationReport {
    /// Whether any failure should fail the command.
    pub fn has_transactional_failures(&self) -> bool {
        self.transactional > 0
    }
}

/// Creates rooms for sessions starting within the preparation window.
#[derive(Clone)]
pub struct SessionPreparer {
    sessions: Arc<dyn SessionRepository>,
    provider: Arc<dyn MeetingProvider>,
    events: Arc<dyn EventPublisher>,
    window: Duration,
}

impl SessionPreparer {
    /// Creates a new preparer with a window of `window_minutes`.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        provider: Arc<dyn MeetingProvider>,
        events: Arc<dyn EventPublisher>,
        window_minutes: i64,
    ) -> Self {
        Self {
            sessions,
            provider,
            events,
            window: Duration::minutes(window_minutes),
        }
    }

    /// Prepare sessions with `as_of < scheduled_at <= as_of + window`.
    ///
    /// With `force`, sessions already READY are prepared again.
    pub async fn prepare(&self, as_of: DateTime<Utc>, force: bool) -> AppResult<PreparationReport> {
        let statuses: &[SessionStatus] = if force {
            &[SessionStatus::Scheduled, SessionStatus::Ready]
        } else {
            &[SessionStatus::Scheduled]
        };

        let due = self
            .sessions
            .find_starting_between(as_of, as_of + self.window, statuses)
            .await?;
        let mut report = PreparationReport {
            eligible: due.len(),
            ..PreparationReport::default()
        };

        info!(eligible = due.len(), force, %as_of, "Preparing sessions");

        for session in &due {
            match self.prepare_one(session, as_of).await {
                Ok(true) => report.prepared += 1,
                Ok(false) => {
                    warn!(session_id = %session.id, "Session changed before preparation, skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "Session preparation failed");
                    report.errors += 1;
                    if e.is_persistence() {
                        report.transactional += 1;
                    }
                }
            }
        }

        info!(
            prepared = report.prepared,
            skipped = report.skipped,
            errors = report.errors,
            "Session preparation finished"
        );
        Ok(report)
    }

    async fn prepare_one(&self, session: &Session, as_of: DateTime<Utc>) -> AppResult<bool> {
        let room = self.provider.prepare_room(session).await.map_err(|e| {
            if e.kind == ErrorKind::Meeting {
                e
            } else {
                AppError::with_source(ErrorKind::Meeting, "Meeting provider failed", e)
            }
        })?;

        let updated = self
            .sessions
            .mark_ready(session.id, session.status, &room, as_of)
            .await?;

        if updated {
            publish_or_warn(
                self.events.as_ref(),
                DomainEvent::at(
                    as_of,
                    SessionEvent::RoomPrepared {
                        session_id: session.id,
                        room,
                    }
                    .into(),
                ),
            )
            .await;
        }
        Ok(updated)
    }
}

impl std::fmt::Debug for SessionPreparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPreparer")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
