//! Granting payment grace periods.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use academy_core::error::AppError;
use academy_core::events::{DomainEvent, SubscriptionEvent};
use academy_core::result::AppResult;
use academy_core::traits::{EventPublisher, publish_or_warn};
use academy_core::types::SubscriptionId;
use academy_database::traits::SubscriptionRepository;
use academy_entity::subscription::{Subscription, SubscriptionStatus};

/// Sets the grace deadline that the suspension sweep later enforces.
#[derive(Clone)]
pub struct GraceService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    events: Arc<dyn EventPublisher>,
}

impl GraceService {
    /// Creates a new grace service.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscriptions,
            events,
        }
    }

    /// Grant a grace period ending at `until`.
    ///
    /// Fails with `NotFound` for an unknown subscription, `Validation` when
    /// it is not ACTIVE or `until` is not after `as_of`, and `Conflict` when a
    /// grace period is already outstanding.
    pub async fn grant(
        &self,
        id: SubscriptionId,
        until: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let mut subscription = self
            .subscriptions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Subscription {id} not found")))?;

        if subscription.status != SubscriptionStatus::Active {
            return Err(AppError::validation(format!(
                "Subscription {id} is {}, only active subscriptions can get a grace period",
                subscription.status
            )));
        }
        if until <= as_of {
            return Err(AppError::validation(format!(
                "Grace deadline {until} must be in the future"
            )));
        }

        subscription.metadata.grant_grace(until)?;

        if !self.subscriptions.grant_grace(id, until).await? {
            return Err(AppError::conflict(format!(
                "Subscription {id} changed while granting the grace period"
            )));
        }

        info!(subscription_id = %id, %until, "Grace period granted");
        publish_or_warn(
            self.events.as_ref(),
            DomainEvent::at(
                as_of,
                SubscriptionEvent::GraceGranted {
                    subscription_id: id,
                    until,
                }
                .into(),
            ),
        )
        .await;

        Ok(subscription)
    }
}

impl std::fmt::Debug for GraceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraceService").finish_non_exhaustive()
    }
}
