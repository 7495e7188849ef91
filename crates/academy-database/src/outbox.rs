//! Domain event outbox.

use async_trait::async_trait;
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::events::DomainEvent;
use academy_core::result::AppResult;
use academy_core::traits::EventPublisher;

/// Appends events to the `domain_events` table for downstream consumers.
#[derive(Debug, Clone)]
pub struct PgEventPublisher {
    pool: PgPool,
}

impl PgEventPublisher {
    /// Create a publisher backed by `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventPublisher for PgEventPublisher {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_value(&event.payload)?;
        sqlx::query(
            "INSERT INTO domain_events (id, event_type, payload, occurred_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(event.id)
        .bind(event.payload.event_type())
        .bind(payload)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append event", e))?;
        Ok(())
    }
}
