//! Live session events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{RecordingId, SessionId, TemplateId};

/// Events related to scheduled sessions and their recordings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Sessions were generated from a recurring template.
    Generated {
        /// The template the sessions came from.
        template_id: TemplateId,
        /// Number of sessions created.
        created: u32,
    },
    /// A meeting room was prepared for an upcoming session.
    RoomPrepared {
        /// The session.
        session_id: SessionId,
        /// Provider room name.
        room: String,
    },
    /// A recording was stopped after the session's scheduled end.
    RecordingStopped {
        /// The session.
        session_id: SessionId,
        /// The recording.
        recording_id: RecordingId,
        /// Scheduled end that triggered the stop.
        scheduled_end: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generated { .. } => "session.generated",
            Self::RoomPrepared { .. } => "session.room_prepared",
            Self::RecordingStopped { .. } => "session.recording_stopped",
        }
    }
}
