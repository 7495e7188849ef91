//! Expiry reminder payload.

use serde::{Deserialize, Serialize};

use academy_core::config::LifecycleConfig;
use academy_core::types::SubscriptionId;
use academy_entity::subscription::{Subscription, SubscriptionKind};

/// Data carried by every expiry reminder, student and guardian alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    /// The expiring subscription.
    pub subscription_id: SubscriptionId,
    /// Quran or academic.
    pub subscription_kind: SubscriptionKind,
    /// e.g. "Quran subscription: Hifz Intensive".
    pub subscription_label: String,
    /// Threshold that fired.
    pub days_left: u32,
    /// End date as `%Y-%m-%d`.
    pub expiry_date: String,
    /// Deep link to the subscription page.
    pub link: String,
    /// Highlight in the client.
    pub urgent: bool,
}

impl ReminderPayload {
    /// Build the payload for `subscription` at threshold `days_left`.
    pub fn build(subscription: &Subscription, days_left: u32, config: &LifecycleConfig) -> Self {
        Self {
            subscription_id: subscription.id,
            subscription_kind: subscription.kind,
            subscription_label: subscription.label(),
            days_left,
            expiry_date: subscription.end_date.format("%Y-%m-%d").to_string(),
            link: format!(
                "{}/subscriptions/{}/{}",
                config.app_url.trim_end_matches('/'),
                subscription.kind.as_str(),
                subscription.id
            ),
            urgent: days_left <= config.urgent_within_days,
        }
    }

    /// "1 day" / "3 days".
    pub fn days_phrase(&self) -> String {
        if self.days_left == 1 {
            "1 day".to_string()
        } else {
            format!("{} days", self.days_left)
        }
    }
}
