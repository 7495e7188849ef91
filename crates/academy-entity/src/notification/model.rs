//! In-app notification row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use academy_core::types::{NotificationId, UserId};

use crate::subscription::SubscriptionKind;

/// Notification categories written by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Student reminder for an expiring Quran subscription.
    QuranSubscriptionExpiring,
    /// Student reminder for an expiring academic subscription.
    AcademicSubscriptionExpiring,
    /// Guardian reminder for any expiring subscription.
    GuardianSubscriptionExpiring,
    /// A pending subscription was cancelled for non-payment.
    SubscriptionCancelled,
    /// A subscription was suspended after its grace period.
    SubscriptionSuspended,
}

impl NotificationType {
    /// Student reminder type for a subscription kind.
    pub fn expiring_for(kind: SubscriptionKind) -> Self {
        match kind {
            SubscriptionKind::Quran => Self::QuranSubscriptionExpiring,
            SubscriptionKind::Academic => Self::AcademicSubscriptionExpiring,
        }
    }

    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuranSubscriptionExpiring => "quran_subscription_expiring",
            Self::AcademicSubscriptionExpiring => "academic_subscription_expiring",
            Self::GuardianSubscriptionExpiring => "guardian_subscription_expiring",
            Self::SubscriptionCancelled => "subscription_cancelled",
            Self::SubscriptionSuspended => "subscription_suspended",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored in-app notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Category.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Structured payload rendered by clients.
    pub data: serde_json::Value,
    /// Deep link.
    pub link: Option<String>,
    /// Tenant and entity context.
    pub context: serde_json::Value,
    /// Highlighted in the client.
    pub urgent: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Recipient.
    pub user_id: UserId,
    /// Category.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Structured payload.
    pub data: serde_json::Value,
    /// Deep link.
    pub link: Option<String>,
    /// Tenant and entity context.
    pub context: serde_json::Value,
    /// Highlighted in the client.
    pub urgent: bool,
}
