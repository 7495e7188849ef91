//! Subscription lifecycle thresholds.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted pending-payment timeout: one year.
pub const MAX_PENDING_TIMEOUT_HOURS: i64 = 24 * 365;

/// Reject a pending-payment timeout outside `1..=MAX_PENDING_TIMEOUT_HOURS`.
pub fn check_pending_timeout(hours: i64) -> Result<i64, AppError> {
    if !(1..=MAX_PENDING_TIMEOUT_HOURS).contains(&hours) {
        return Err(AppError::validation(format!(
            "Pending timeout must be between 1 and {MAX_PENDING_TIMEOUT_HOURS} hours, got {hours}"
        )));
    }
    Ok(hours)
}

/// Thresholds used by the subscription sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Days before `end_date` on which an expiry reminder is sent.
    #[serde(default = "default_reminder_days")]
    pub reminder_days: Vec<u32>,
    /// Reminders with `days_left` at or below this value are urgent.
    #[serde(default = "default_urgent_within")]
    pub urgent_within_days: u32,
    /// Hours a subscription may stay pending before it is cancelled.
    #[serde(default = "default_pending_timeout")]
    pub pending_timeout_hours: i64,
    /// Base URL used to build deep links in notifications.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            reminder_days: default_reminder_days(),
            urgent_within_days: default_urgent_within(),
            pending_timeout_hours: default_pending_timeout(),
            app_url: default_app_url(),
        }
    }
}

fn default_reminder_days() -> Vec<u32> {
    vec![7, 3, 1]
}

fn default_urgent_within() -> u32 {
    3
}

fn default_pending_timeout() -> i64 {
    48
}

fn default_app_url() -> String {
    "http://localhost:8000".to_string()
}
