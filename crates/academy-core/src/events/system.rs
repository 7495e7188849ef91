//! System-level events.

use serde::{Deserialize, Serialize};

/// Scheduler-level events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemEvent {
    /// A sweep finished a real (non dry-run) pass.
    SweepCompleted {
        /// Sweep command name.
        sweep: String,
        /// Candidates found.
        candidates: usize,
        /// Candidates applied.
        applied: usize,
        /// Per-item failures.
        errors: usize,
    },
    /// An operator purged in-app notifications.
    NotificationsPurged {
        /// Rows removed.
        removed: u64,
    },
}

impl SystemEvent {
    /// Dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SweepCompleted { .. } => "system.sweep_completed",
            Self::NotificationsPurged { .. } => "system.notifications_purged",
        }
    }
}
