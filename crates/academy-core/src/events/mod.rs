//! Domain events emitted by lifecycle sweeps.
//!
//! Events are handed to an [`EventPublisher`](crate::traits::EventPublisher)
//! after the state change they describe has been persisted.

pub mod session;
pub mod subscription;
pub mod system;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::SessionEvent;
pub use subscription::SubscriptionEvent;
pub use system::SystemEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A subscription-related event.
    Subscription(SubscriptionEvent),
    /// A session-related event.
    Session(SessionEvent),
    /// A system-level event.
    System(SystemEvent),
}

impl EventPayload {
    /// Short name used as the event type column in the outbox.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Subscription(e) => e.name(),
            Self::Session(e) => e.name(),
            Self::System(e) => e.name(),
        }
    }
}

impl DomainEvent {
    /// Create a new domain event stamped with the sweep's reference time.
    pub fn at(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            payload,
        }
    }
}

impl From<SubscriptionEvent> for EventPayload {
    fn from(event: SubscriptionEvent) -> Self {
        Self::Subscription(event)
    }
}

impl From<SessionEvent> for EventPayload {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}

impl From<SystemEvent> for EventPayload {
    fn from(event: SystemEvent) -> Self {
        Self::System(event)
    }
}
