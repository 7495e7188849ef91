//! Student directory implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use academy_core::error::{AppError, ErrorKind};
use academy_core::result::AppResult;
use academy_core::types::StudentId;
use academy_entity::student::{Guardian, Student, StudentContact};

use crate::traits::StudentDirectory;

/// PostgreSQL student and guardian lookup.
#[derive(Debug, Clone)]
pub struct PgStudentDirectory {
    pool: PgPool,
}

impl PgStudentDirectory {
    /// Create a new student directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn find_contact(&self, student_id: StudentId) -> AppResult<Option<StudentContact>> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find student", e))?;

        let Some(student) = student else {
            return Ok(None);
        };

        let guardian = match student.guardian_id {
            Some(guardian_id) => {
                sqlx::query_as::<_, Guardian>("SELECT * FROM guardians WHERE id = $1")
                    .bind(guardian_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find guardian", e)
                    })?
            }
            None => None,
        };

        Ok(Some(StudentContact { student, guardian }))
    }
}
