//! Student and guardian entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use academy_core::types::{AcademyId, GuardianId, StudentId, UserId};

/// A student profile inside an academy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Unique student identifier.
    pub id: StudentId,
    /// Owning academy.
    pub academy_id: AcademyId,
    /// Platform user that receives notifications.
    pub user_id: UserId,
    /// Display name.
    pub full_name: String,
    /// Parent or guardian, if one is linked.
    pub guardian_id: Option<GuardianId>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

/// A parent or guardian linked to one or more students.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Guardian {
    /// Unique guardian identifier.
    pub id: GuardianId,
    /// Platform user that receives notifications.
    pub user_id: UserId,
    /// Display name.
    pub full_name: String,
}

/// A student resolved together with their guardian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentContact {
    /// The student.
    pub student: Student,
    /// The guardian, when linked and resolvable.
    pub guardian: Option<Guardian>,
}
