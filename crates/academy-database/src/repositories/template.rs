//! Schedule template repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_entity::session::ScheduleTemplate;

use crate::traits::ScheduleTemplateRepository;

/// PostgreSQL `schedule_templates` table.
#[derive(Debug, Clone)]
pub struct PgScheduleTemplateRepository {
    pool: PgPool,
}

impl PgScheduleTemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleTemplateRepository for PgScheduleTemplateRepository {
    async fn find_active(&self) -> AppResult<Vec<ScheduleTemplate>> {
        sqlx::query_as::<_, ScheduleTemplate>(
            "SELECT * FROM schedule_templates WHERE is_active ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load templates", e))
    }
}
