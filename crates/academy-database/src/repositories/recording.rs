//! Recording repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_core::types::{RecordingId, SessionId};
use academy_entity::session::{Recording, Session};

use crate::traits::{ActiveRecording, RecordingRepository};

/// PostgreSQL recording repository.
#[derive(Debug, Clone)]
pub struct PgRecordingRepository {
    pool: PgPool,
}

impl PgRecordingRepository {
    /// Create a new recording repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordingRepository for PgRecordingRepository {
    async fn find_active(&self) -> AppResult<Vec<ActiveRecording>> {
        let recordings = sqlx::query_as::<_, Recording>(
            "SELECT * FROM recordings WHERE status = 'recording' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query active recordings", e)
        })?;

        if recordings.is_empty() {
            return Ok(Vec::new());
        }

        let session_ids: Vec<uuid::Uuid> = recordings
            .iter()
            .map(|r| r.session_id.into_uuid())
            .collect();
        let sessions = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ANY($1)")
            .bind(session_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load recorded sessions", e)
            })?;
        let sessions: HashMap<SessionId, Session> =
            sessions.into_iter().map(|s| (s.id, s)).collect();

        let mut active: Vec<ActiveRecording> = recordings
            .into_iter()
            .filter_map(|recording| {
                let session = sessions.get(&recording.session_id).cloned()?;
                Some(ActiveRecording { session, recording })
            })
            .collect();

        active.sort_by(|a, b| {
            a.session
                .scheduled_at
                .cmp(&b.session.scheduled_at)
                .then(a.recording.id.cmp(&b.recording.id))
        });
        Ok(active)
    }

    async fn mark_stopped(&self, id: RecordingId, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE recordings SET status = 'stopped', stopped_at = $2 \
             WHERE id = $1 AND status = 'recording'",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark recording stopped", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}
