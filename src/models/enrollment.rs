// src/models/enrollment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'enrollments' table in the database.
/// Links a user to a course, granting access to its lessons.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}
