//! Subscription status and kind enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Created, waiting for the first payment.
    Pending,
    /// Paid and running.
    Active,
    /// Grace window passed without payment.
    Suspended,
    /// Cancelled, e.g. after the pending timeout.
    Cancelled,
    /// `end_date` passed.
    Expired,
}

impl SubscriptionStatus {
    /// Whether the lifecycle allows moving from `self` to `target`.
    pub fn can_transition_to(&self, target: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Pending, Active)
                | (Pending, Cancelled)
                | (Active, Expired)
                | (Active, Suspended)
                | (Active, Cancelled)
                | (Suspended, Active)
                | (Suspended, Cancelled)
        )
    }

    /// Check if the subscription is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which catalogue a subscription belongs to.
///
/// Both kinds share the same shape; they differ in notification copy and
/// in the deep link the client opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    /// Quran memorization/recitation circle.
    Quran,
    /// Academic tutoring package.
    Academic,
}

impl SubscriptionKind {
    /// Lowercase identifier used in links and job payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quran => "quran",
            Self::Academic => "academic",
        }
    }

    /// Title-cased name for notification copy.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Quran => "Quran",
            Self::Academic => "Academic",
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_transitions_are_legal() {
        assert!(SubscriptionStatus::Pending.can_transition_to(SubscriptionStatus::Cancelled));
        assert!(SubscriptionStatus::Active.can_transition_to(SubscriptionStatus::Suspended));
        assert!(SubscriptionStatus::Suspended.can_transition_to(SubscriptionStatus::Active));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!SubscriptionStatus::Cancelled.can_transition_to(SubscriptionStatus::Active));
        assert!(!SubscriptionStatus::Pending.can_transition_to(SubscriptionStatus::Suspended));
        assert!(!SubscriptionStatus::Expired.can_transition_to(SubscriptionStatus::Active));
        assert!(!SubscriptionStatus::Active.can_transition_to(SubscriptionStatus::Active));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SubscriptionStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
        let kind: SubscriptionKind = serde_json::from_str("\"academic\"").unwrap();
        assert_eq!(kind, SubscriptionKind::Academic);
    }
}
