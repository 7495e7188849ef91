//! Notification delivery seam.
//!
//! The scheduler only writes the in-app notification row. Push, mail and
//! SMS fan-out happen downstream of the `notifications` table.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use academy_core::result::AppResult;
use academy_core::types::UserId;
use academy_database::traits::NotificationRepository;
use academy_entity::notification::{CreateNotification, NotificationType};
use academy_entity::student::{Guardian, Student};
use academy_entity::subscription::Subscription;

use super::payload::ReminderPayload;

/// A notification ready to be delivered to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingNotification {
    /// Recipient.
    pub recipient: UserId,
    /// Category.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// The reminder data.
    pub payload: ReminderPayload,
    /// Tenant and entity context.
    pub context: serde_json::Value,
}

impl OutgoingNotification {
    /// The reminder a student receives for their own subscription.
    pub fn student_reminder(
        student: &Student,
        subscription: &Subscription,
        payload: ReminderPayload,
    ) -> Self {
        Self {
            recipient: student.user_id,
            notification_type: NotificationType::expiring_for(subscription.kind),
            title: "Subscription expiring soon".to_string(),
            message: format!(
                "Your {} expires in {} on {}. Renew to keep your sessions.",
                payload.subscription_label,
                payload.days_phrase(),
                payload.expiry_date
            ),
            context: context(subscription),
            payload,
        }
    }

    /// The reminder a guardian receives for a linked student.
    pub fn guardian_reminder(
        guardian: &Guardian,
        student: &Student,
        subscription: &Subscription,
        payload: ReminderPayload,
    ) -> Self {
        Self {
            recipient: guardian.user_id,
            notification_type: NotificationType::GuardianSubscriptionExpiring,
            title: format!("{}'s subscription is expiring", student.full_name),
            message: format!(
                "{}'s {} expires in {} on {}.",
                student.full_name,
                payload.subscription_label,
                payload.days_phrase(),
                payload.expiry_date
            ),
            context: context(subscription),
            payload,
        }
    }
}

fn context(subscription: &Subscription) -> serde_json::Value {
    serde_json::json!({
        "academy_id": subscription.academy_id,
        "subscription_id": subscription.id,
        "student_id": subscription.student_id,
    })
}

/// Delivers human-facing notifications.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: OutgoingNotification) -> AppResult<()>;

    /// Deliver the guardian copy of an expiry reminder.
    async fn send_guardian_reminder(
        &self,
        guardian: &Guardian,
        student: &Student,
        subscription: &Subscription,
        payload: &ReminderPayload,
    ) -> AppResult<()> {
        self.send(OutgoingNotification::guardian_reminder(
            guardian,
            student,
            subscription,
            payload.clone(),
        ))
        .await
    }
}

/// Writes notifications to the `notifications` table.
#[derive(Clone)]
pub struct DbNotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
}

impl DbNotificationDispatcher {
    /// Create a dispatcher over `notifications`.
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }
}

impl std::fmt::Debug for DbNotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbNotificationDispatcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationDispatcher for DbNotificationDispatcher {
    async fn send(&self, notification: OutgoingNotification) -> AppResult<()> {
        let urgent = notification.payload.urgent;
        let link = Some(notification.payload.link.clone());
        let data = serde_json::to_value(&notification.payload)?;

        let stored = self
            .notifications
            .create(CreateNotification {
                user_id: notification.recipient,
                notification_type: notification.notification_type,
                title: notification.title,
                message: notification.message,
                data,
                link,
                context: notification.context,
                urgent,
            })
            .await?;

        debug!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            notification_type = %stored.notification_type,
            "Notification stored"
        );
        Ok(())
    }
}
