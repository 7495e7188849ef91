//! Applies candidates exactly once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use academy_core::config::LifecycleConfig;
use academy_core::error::{AppError, ErrorKind};
use academy_core::events::{DomainEvent, SubscriptionEvent};
use academy_core::traits::{EventPublisher, publish_or_warn};
use academy_database::traits::{DispatchLog, StatusChange, SubscriptionRepository};
use academy_entity::student::StudentContact;
use academy_service::notification::{NotificationDispatcher, OutgoingNotification, ReminderPayload};

use super::RunMode;
use super::candidate::{Candidate, LifecycleAction, TriggerReason};

/// Result of applying one candidate.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The transition or reminder happened.
    Applied,
    /// Dry run; nothing was written.
    Previewed,
    /// Not applied, and not an error.
    Skipped(String),
    /// Applying failed; the batch continues.
    Failed(AppError),
}

impl Outcome {
    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Previewed => "previewed",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

const CONCURRENT_CHANGE: &str = "state changed concurrently";

/// Writes transitions with an expected-status guard and sends reminders.
#[derive(Clone)]
pub struct TransitionExecutor {
    subscriptions: Arc<dyn SubscriptionRepository>,
    dispatch_log: Arc<dyn DispatchLog>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    events: Arc<dyn EventPublisher>,
    config: LifecycleConfig,
}

impl TransitionExecutor {
    /// Creates a new executor.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        dispatch_log: Arc<dyn DispatchLog>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        events: Arc<dyn EventPublisher>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            subscriptions,
            dispatch_log,
            dispatcher,
            events,
            config,
        }
    }

    /// Apply `candidate`, or only preview it in dry-run mode.
    pub async fn apply(&self, candidate: &Candidate, mode: RunMode, as_of: DateTime<Utc>) -> Outcome {
        if !mode.is_apply() {
            return Outcome::Previewed;
        }

        match candidate.action {
            LifecycleAction::Notify { days_left } => self.notify(candidate, days_left, as_of).await,
            LifecycleAction::Cancel => {
                let change = StatusChange::cancel(as_of, candidate.reason.to_string());
                self.transition(candidate, change).await
            }
            LifecycleAction::Suspend => {
                self.transition(candidate, StatusChange::suspend(as_of)).await
            }
        }
    }

    async fn transition(&self, candidate: &Candidate, change: StatusChange) -> Outcome {
        let subscription = &candidate.subscription;
        let expected = candidate.action.expected_status();
        let target = change.target;
        let at = change.at;
        let reason = change.reason.clone();

        match self
            .subscriptions
            .transition(subscription.id, expected, change)
            .await
        {
            Ok(true) => {
                info!(
                    subscription_id = %subscription.id,
                    from = %expected,
                    to = %target,
                    "Subscription transitioned"
                );
                let event = match &candidate.reason {
                    TriggerReason::GraceExpired {
                        grace_period_ends_at,
                    } => SubscriptionEvent::Suspended {
                        subscription_id: subscription.id,
                        grace_period_ended_at: *grace_period_ends_at,
                    },
                    _ => SubscriptionEvent::Cancelled {
                        subscription_id: subscription.id,
                        reason: reason.unwrap_or_default(),
                    },
                };
                publish_or_warn(self.events.as_ref(), DomainEvent::at(at, event.into())).await;
                Outcome::Applied
            }
            Ok(false) => {
                warn!(
                    subscription_id = %subscription.id,
                    expected = %expected,
                    "Subscription no longer matches, transition skipped"
                );
                Outcome::Skipped(CONCURRENT_CHANGE.to_string())
            }
            Err(e) => {
                error!(subscription_id = %subscription.id, error = %e, "Transition failed");
                Outcome::Failed(e)
            }
        }
    }

    async fn notify(&self, candidate: &Candidate, days_left: u32, as_of: DateTime<Utc>) -> Outcome {
        let subscription = &candidate.subscription;
        let Some(StudentContact { student, guardian }) = candidate.contact.as_ref() else {
            return Outcome::Skipped("no recipient resolved".to_string());
        };
        let Some(key) = candidate.dispatch_key() else {
            return Outcome::Skipped("not a reminder".to_string());
        };

        match self.subscriptions.find_by_id(subscription.id).await {
            Ok(Some(current))
                if current.status == candidate.action.expected_status()
                    && current.end_date == subscription.end_date => {}
            Ok(_) => {
                warn!(
                    subscription_id = %subscription.id,
                    "Subscription changed since evaluation, reminder skipped"
                );
                return Outcome::Skipped(CONCURRENT_CHANGE.to_string());
            }
            Err(e) => {
                error!(subscription_id = %subscription.id, error = %e, "Failed to reload subscription");
                return Outcome::Failed(e);
            }
        }

        match self.dispatch_log.claim(&key, as_of).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(%key, "Reminder claimed by another run");
                return Outcome::Skipped("reminder already sent".to_string());
            }
            Err(e) => {
                error!(%key, error = %e, "Failed to claim reminder");
                return Outcome::Failed(e);
            }
        }

        let payload = ReminderPayload::build(subscription, days_left, &self.config);
        let notification =
            OutgoingNotification::student_reminder(student, subscription, payload.clone());

        if let Err(e) = self.dispatcher.send(notification).await {
            warn!(
                subscription_id = %subscription.id,
                user_id = %student.user_id,
                error = %e,
                "Reminder delivery failed"
            );
            if let Err(release_err) = self.dispatch_log.release(&key).await {
                error!(%key, error = %release_err, "Failed to release reminder claim");
            }
            return Outcome::Failed(AppError::with_source(
                ErrorKind::Notification,
                format!("Reminder for subscription {} not delivered", subscription.id),
                e,
            ));
        }

        let mut guardian_notified = false;
        if let Some(guardian) = guardian {
            match self
                .dispatcher
                .send_guardian_reminder(guardian, student, subscription, &payload)
                .await
            {
                Ok(()) => guardian_notified = true,
                Err(e) => warn!(
                    subscription_id = %subscription.id,
                    guardian_id = %guardian.id,
                    error = %e,
                    "Guardian reminder failed"
                ),
            }
        }

        info!(
            subscription_id = %subscription.id,
            days_left,
            urgent = payload.urgent,
            guardian_notified,
            "Expiry reminder sent"
        );
        publish_or_warn(
            self.events.as_ref(),
            DomainEvent::at(
                as_of,
                SubscriptionEvent::ExpiryReminderSent {
                    subscription_id: subscription.id,
                    days_left,
                    guardian_notified,
                }
                .into(),
            ),
        )
        .await;

        Outcome::Applied
    }
}

impl std::fmt::Debug for TransitionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionExecutor").finish_non_exhaustive()
    }
}
