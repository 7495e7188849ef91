//! Reminder dedup log implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_entity::notification::DispatchKey;

use crate::traits::DispatchLog;

/// PostgreSQL `notification_dispatch_log`.
#[derive(Debug, Clone)]
pub struct PgDispatchLog {
    pool: PgPool,
}

impl PgDispatchLog {
    /// Create a new dispatch log.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchLog for PgDispatchLog {
    async fn was_sent(&self, key: &DispatchKey) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM notification_dispatch_log \
             WHERE subscription_id = $1 AND days_left = $2 AND end_date = $3)",
        )
        .bind(key.subscription_id)
        .bind(key.days_left as i32)
        .bind(key.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read dispatch log", e))
    }

    async fn claim(&self, key: &DispatchKey, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO notification_dispatch_log (subscription_id, days_left, end_date, sent_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(key.subscription_id)
        .bind(key.days_left as i32)
        .bind(key.end_date)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim dispatch key", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, key: &DispatchKey) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM notification_dispatch_log \
             WHERE subscription_id = $1 AND days_left = $2 AND end_date = $3",
        )
        .bind(key.subscription_id)
        .bind(key.days_left as i32)
        .bind(key.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to release dispatch key", e)
        })?;
        Ok(())
    }
}
