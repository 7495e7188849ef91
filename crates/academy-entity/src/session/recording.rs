//! Session recording entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use academy_core::types::{RecordingId, SessionId};

/// Recording lifecycle: `not_started -> recording -> stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recording_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    /// Requested but not yet running.
    NotStarted,
    /// Currently recording.
    Recording,
    /// Finished.
    Stopped,
}

impl RecordingStatus {
    /// Whether the lifecycle allows moving from `self` to `target`.
    pub fn can_transition_to(&self, target: RecordingStatus) -> bool {
        matches!(
            (self, target),
            (Self::NotStarted, Self::Recording) | (Self::Recording, Self::Stopped)
        )
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recording attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recording {
    /// Unique recording identifier.
    pub id: RecordingId,
    /// The recorded session.
    pub session_id: SessionId,
    /// Current status.
    pub status: RecordingStatus,
    /// Provider-side recording handle.
    pub provider_ref: Option<String>,
    /// When recording started.
    pub started_at: Option<DateTime<Utc>>,
    /// When recording stopped.
    pub stopped_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl Recording {
    /// Whether the recording is currently running.
    pub fn is_active(&self) -> bool {
        self.status == RecordingStatus::Recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_lifecycle() {
        assert!(RecordingStatus::NotStarted.can_transition_to(RecordingStatus::Recording));
        assert!(RecordingStatus::Recording.can_transition_to(RecordingStatus::Stopped));
        assert!(!RecordingStatus::Stopped.can_transition_to(RecordingStatus::Recording));
        assert!(!RecordingStatus::NotStarted.can_transition_to(RecordingStatus::Stopped));
    }
}
