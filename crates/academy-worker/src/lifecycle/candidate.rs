//! Proposed transitions produced by the evaluator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use academy_entity::notification::DispatchKey;
use academy_entity::student::StudentContact;
use academy_entity::subscription::{Subscription, SubscriptionStatus};

/// What the executor should do with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Send the expiry reminder for this threshold.
    Notify {
        /// Threshold in days.
        days_left: u32,
    },
    /// PENDING -> CANCELLED.
    Cancel,
    /// ACTIVE -> SUSPENDED, consuming the grace period.
    Suspend,
}

impl LifecycleAction {
    /// Status the subscription must still be in when the action is applied.
    pub fn expected_status(&self) -> SubscriptionStatus {
        match self {
            Self::Notify { .. } | Self::Suspend => SubscriptionStatus::Active,
            Self::Cancel => SubscriptionStatus::Pending,
        }
    }

    /// Status written by the action; `None` for notifications.
    pub fn target_status(&self) -> Option<SubscriptionStatus> {
        match self {
            Self::Notify { .. } => None,
            Self::Cancel => Some(SubscriptionStatus::Cancelled),
            Self::Suspend => Some(SubscriptionStatus::Suspended),
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notify { days_left } => write!(f, "notify ({days_left}d)"),
            Self::Cancel => f.write_str("cancel"),
            Self::Suspend => f.write_str("suspend"),
        }
    }
}

/// Why a candidate was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TriggerReason {
    /// End date falls on the day `days_left` days after `as_of`.
    ExpiresIn {
        /// Threshold in days.
        days_left: u32,
    },
    /// Created more than `timeout_hours` before `as_of` without payment.
    PendingTimeout {
        /// Configured or overridden timeout.
        timeout_hours: i64,
    },
    /// Grace deadline passed without payment.
    GraceExpired {
        /// The deadline that passed.
        grace_period_ends_at: DateTime<Utc>,
    },
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpiresIn { days_left } => write!(f, "expires in {days_left} day(s)"),
            Self::PendingTimeout { timeout_hours } => {
                write!(f, "payment not received within {timeout_hours} hours")
            }
            Self::GraceExpired {
                grace_period_ends_at,
            } => write!(
                f,
                "grace period ended {}",
                grace_period_ends_at.format("%Y-%m-%d %H:%M UTC")
            ),
        }
    }
}

/// One subscription crossing one threshold.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Snapshot taken during evaluation.
    pub subscription: Subscription,
    /// Recipients; resolved for reminders only.
    pub contact: Option<StudentContact>,
    /// Proposed action.
    pub action: LifecycleAction,
    /// Why it was selected.
    pub reason: TriggerReason,
    /// The `as_of` the evaluation ran at.
    pub trigger_time: DateTime<Utc>,
}

impl Candidate {
    /// Dedup key for reminder candidates.
    pub fn dispatch_key(&self) -> Option<DispatchKey> {
        match self.action {
            LifecycleAction::Notify { days_left } => Some(DispatchKey::new(
                self.subscription.id,
                days_left,
                self.subscription.end_date,
            )),
            _ => None,
        }
    }
}
