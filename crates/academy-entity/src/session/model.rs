//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use academy_core::types::{AcademyId, SessionId, SubscriptionId, TemplateId};

use super::status::{SessionKind, SessionStatus};

/// A scheduled live meeting instance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Owning academy.
    pub academy_id: AcademyId,
    /// Session variant.
    pub kind: SessionKind,
    /// Subscription the session belongs to, if any.
    pub subscription_id: Option<SubscriptionId>,
    /// Template the session was generated from, if any.
    pub template_id: Option<TemplateId>,
    /// Scheduled start.
    pub scheduled_at: DateTime<Utc>,
    /// Planned length; `None` means the configured default.
    pub duration_minutes: Option<i32>,
    /// Current status.
    pub status: SessionStatus,
    /// Provider room name once prepared.
    pub meeting_room: Option<String>,
    /// When the room was prepared.
    pub prepared_at: Option<DateTime<Utc>>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Planned length, falling back to `default_minutes`.
    pub fn effective_duration(&self, default_minutes: i64) -> Duration {
        match self.duration_minutes {
            Some(minutes) if minutes > 0 => Duration::minutes(minutes as i64),
            _ => Duration::minutes(default_minutes),
        }
    }

    /// `scheduled_at + duration`.
    pub fn scheduled_end_time(&self, default_minutes: i64) -> DateTime<Utc> {
        self.scheduled_at + self.effective_duration(default_minutes)
    }

    /// Whether the scheduled end has been reached at `as_of`.
    pub fn has_ended(&self, as_of: DateTime<Utc>, default_minutes: i64) -> bool {
        as_of >= self.scheduled_end_time(default_minutes)
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// Owning academy.
    pub academy_id: AcademyId,
    /// Session variant.
    pub kind: SessionKind,
    /// Subscription the session belongs to.
    pub subscription_id: Option<SubscriptionId>,
    /// Source template.
    pub template_id: Option<TemplateId>,
    /// Scheduled start.
    pub scheduled_at: DateTime<Utc>,
    /// Planned length.
    pub duration_minutes: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(duration: Option<i32>) -> Session {
        let at = Utc.with_ymd_and_hms(2025, 5, 4, 16, 0, 0).unwrap();
        Session {
            id: SessionId::new(),
            academy_id: AcademyId::new(),
            kind: SessionKind::Quran,
            subscription_id: None,
            template_id: None,
            scheduled_at: at,
            duration_minutes: duration,
            status: SessionStatus::Ongoing,
            meeting_room: None,
            prepared_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_default_duration() {
        let s = session(None);
        assert_eq!(s.scheduled_end_time(60), s.scheduled_at + Duration::minutes(60));
        let s = session(Some(0));
        assert_eq!(s.scheduled_end_time(60), s.scheduled_at + Duration::minutes(60));
    }

    #[test]
    fn test_has_ended_boundary() {
        let s = session(Some(45));
        let end = s.scheduled_at + Duration::minutes(45);
        assert!(s.has_ended(end, 60));
        assert!(!s.has_ended(end - Duration::seconds(1), 60));
    }
}
