//! Subscription entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use academy_core::types::{AcademyId, StudentId, SubscriptionId};

use super::metadata::SubscriptionMetadata;
use super::status::{SubscriptionKind, SubscriptionStatus};

/// A student's Quran or academic subscription.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    /// Unique subscription identifier.
    pub id: SubscriptionId,
    /// Owning academy (tenant).
    pub academy_id: AcademyId,
    /// Quran or academic.
    pub kind: SubscriptionKind,
    /// The subscribed student.
    pub student_id: StudentId,
    /// Package name shown to the student.
    pub package_name: String,
    /// Current lifecycle status.
    pub status: SubscriptionStatus,
    /// When the paid period ends.
    pub end_date: DateTime<Utc>,
    /// Free-form metadata with a typed grace deadline.
    pub metadata: Json<SubscriptionMetadata>,
    /// When the subscription was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Why the subscription was cancelled.
    pub cancellation_reason: Option<String>,
    /// When the subscription was suspended.
    pub suspended_at: Option<DateTime<Utc>>,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// When the subscription was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Human-readable label used in notifications.
    pub fn label(&self) -> String {
        format!(
            "{} subscription: {}",
            self.kind.display_name(),
            self.package_name
        )
    }

    /// The outstanding grace deadline, if any.
    pub fn grace_period_ends_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.grace_period_ends_at
    }

    /// Active with a grace deadline strictly before `as_of`.
    pub fn is_grace_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.metadata.grace_expired(as_of)
    }

    /// Pending and created strictly before `as_of - timeout`.
    pub fn is_pending_stale(&self, as_of: DateTime<Utc>, timeout: Duration) -> bool {
        self.status == SubscriptionStatus::Pending && self.created_at < as_of - timeout
    }

    /// Active and ending inside `[start, end)`.
    pub fn is_active_ending_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date >= start && self.end_date < end
    }
}

/// Data required to create a new subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    /// Owning academy.
    pub academy_id: AcademyId,
    /// Quran or academic.
    pub kind: SubscriptionKind,
    /// The subscribed student.
    pub student_id: StudentId,
    /// Package name.
    pub package_name: String,
    /// Initial status.
    pub status: SubscriptionStatus,
    /// End of the paid period.
    pub end_date: DateTime<Utc>,
}
