//! Subscription repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_core::types::SubscriptionId;
use academy_entity::subscription::{Subscription, SubscriptionStatus};

use crate::traits::{StatusChange, SubscriptionRepository};

/// PostgreSQL subscription repository.
#[derive(Debug, Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> AppResult<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find subscription", e)
            })
    }

    async fn find_active_ending_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions \
             WHERE status = 'active' AND end_date >= $1 AND end_date < $2 \
             ORDER BY end_date, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query expiring subscriptions",
                e,
            )
        })
    }

    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions \
             WHERE status = 'pending' AND created_at < $1 \
             ORDER BY created_at, id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query stale pending subscriptions",
                e,
            )
        })
    }

    async fn find_active_with_grace_before(
        &self,
        as_of: DateTime<Utc>,
    ) -> AppResult<Vec<Subscription>> {
        // The deadline is written by other services in more than one format,
        // so it is parsed by `SubscriptionMetadata` instead of cast in SQL.
        let rows = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions \
             WHERE status = 'active' \
               AND metadata ? 'grace_period_ends_at'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query expired grace periods",
                e,
            )
        })?;

        let mut expired: Vec<Subscription> = rows
            .into_iter()
            .filter(|s| s.is_grace_expired(as_of))
            .collect();
        expired.sort_by_key(|s| (s.grace_period_ends_at(), s.id));
        Ok(expired)
    }

    async fn transition(
        &self,
        id: SubscriptionId,
        expected: SubscriptionStatus,
        change: StatusChange,
    ) -> AppResult<bool> {
        let result = if change.clear_grace {
            sqlx::query(
                "UPDATE subscriptions SET status = $3, suspended_at = $4, \
                 metadata = metadata - 'grace_period_ends_at', updated_at = $4 \
                 WHERE id = $1 AND status = $2 AND metadata ? 'grace_period_ends_at'",
            )
            .bind(id)
            .bind(expected)
            .bind(change.target)
            .bind(change.at)
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE subscriptions SET status = $3, \
                 cancelled_at = CASE WHEN $3 = 'cancelled'::subscription_status THEN $4 ELSE cancelled_at END, \
                 cancellation_reason = COALESCE($5, cancellation_reason), \
                 updated_at = $4 \
                 WHERE id = $1 AND status = $2",
            )
            .bind(id)
            .bind(expected)
            .bind(change.target)
            .bind(change.at)
            .bind(change.reason.as_deref())
            .execute(&self.pool)
            .await
        }
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to move subscription {id} to {}", change.target),
                e,
            )
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn grant_grace(&self, id: SubscriptionId, until: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE subscriptions SET \
             metadata = jsonb_set(metadata, '{grace_period_ends_at}', to_jsonb($2::timestamptz)), \
             updated_at = NOW() \
             WHERE id = $1 AND status = 'active' AND NOT (metadata ? 'grace_period_ends_at')",
        )
        .bind(id)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to grant grace period", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}
