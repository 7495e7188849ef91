//! Subscription lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SubscriptionId;

/// Events describing subscription state changes and reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SubscriptionEvent {
    /// An expiry reminder was delivered to the student.
    ExpiryReminderSent {
        /// The subscription.
        subscription_id: SubscriptionId,
        /// Days remaining until `end_date`.
        days_left: u32,
        /// Whether a guardian copy was also delivered.
        guardian_notified: bool,
    },
    /// A stale pending subscription was cancelled.
    Cancelled {
        /// The subscription.
        subscription_id: SubscriptionId,
        /// Why it was cancelled.
        reason: String,
    },
    /// An active subscription was suspended after its grace deadline.
    Suspended {
        /// The subscription.
        subscription_id: SubscriptionId,
        /// The grace deadline that passed.
        grace_period_ended_at: DateTime<Utc>,
    },
    /// An admin granted a payment grace window.
    GraceGranted {
        /// The subscription.
        subscription_id: SubscriptionId,
        /// The new grace deadline.
        until: DateTime<Utc>,
    },
}

impl SubscriptionEvent {
    /// Dotted event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExpiryReminderSent { .. } => "subscription.expiry_reminder_sent",
            Self::Cancelled { .. } => "subscription.cancelled",
            Self::Suspended { .. } => "subscription.suspended",
            Self::GraceGranted { .. } => "subscription.grace_granted",
        }
    }
}
