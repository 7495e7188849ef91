//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_core::types::SessionId;
use academy_entity::session::{NewSession, Session, SessionStatus};

use crate::traits::SessionRepository;

/// PostgreSQL session repository.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn create_if_absent(&self, session: NewSession) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO sessions \
             (academy_id, kind, subscription_id, template_id, scheduled_at, duration_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (template_id, scheduled_at) DO NOTHING",
        )
        .bind(session.academy_id)
        .bind(session.kind)
        .bind(session.subscription_id)
        .bind(session.template_id)
        .bind(session.scheduled_at)
        .bind(session.duration_minutes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_starting_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
        statuses: &[SessionStatus],
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions \
             WHERE scheduled_at > $1 AND scheduled_at <= $2 AND status = ANY($3) \
             ORDER BY scheduled_at, id",
        )
        .bind(after)
        .bind(until)
        .bind(statuses.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query upcoming sessions", e)
        })
    }

    async fn mark_ready(
        &self,
        id: SessionId,
        expected: SessionStatus,
        room: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET status = 'ready', meeting_room = $3, prepared_at = $4, \
             updated_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(room)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark session ready", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}
