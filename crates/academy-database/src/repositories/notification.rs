//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_entity::notification::{CreateNotification, Notification};

use crate::traits::NotificationRepository;

/// PostgreSQL `notifications` table.
#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, data: CreateNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
             (user_id, notification_type, title, message, data, link, context, urgent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.notification_type)
        .bind(&data.title)
        .bind(&data.message)
        .bind(&data.data)
        .bind(&data.link)
        .bind(&data.context)
        .bind(data.urgent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn purge(&self, before: Option<DateTime<Utc>>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE $1::timestamptz IS NULL OR created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge notifications", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn count(&self, before: Option<DateTime<Utc>>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE $1::timestamptz IS NULL OR created_at < $1",
        )
        .bind(before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;
        Ok(count as u64)
    }
}
