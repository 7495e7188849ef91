//! Domain event publishing.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Sink for domain events produced by sweeps.
///
/// Publishing happens after the state change is committed; a failed
/// publish is logged by the caller and never rolls the change back.
#[async_trait]
pub trait EventPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a single event.
    async fn publish(&self, event: DomainEvent) -> AppResult<()>;
}

/// Publish `event`, logging instead of failing when the sink is down.
pub async fn publish_or_warn(publisher: &dyn EventPublisher, event: DomainEvent) {
    let event_type = event.payload.event_type();
    if let Err(e) = publisher.publish(event).await {
        tracing::warn!(event_type, error = %e, "Failed to publish domain event");
    }
}
