//! Reminder dedup key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use academy_core::types::SubscriptionId;

/// Identifies one expiry reminder: a subscription, a threshold, and the end
/// date it was computed against. A renewed subscription has a new end date
/// and therefore gets fresh reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchKey {
    /// Reminded subscription.
    pub subscription_id: SubscriptionId,
    /// Threshold in days.
    pub days_left: u32,
    /// End date at the time of reminding.
    pub end_date: DateTime<Utc>,
}

impl DispatchKey {
    /// Create a key.
    pub fn new(subscription_id: SubscriptionId, days_left: u32, end_date: DateTime<Utc>) -> Self {
        Self {
            subscription_id,
            days_left,
            end_date,
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}d:{}",
            self.subscription_id,
            self.days_left,
            self.end_date.format("%Y-%m-%d")
        )
    }
}
