// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{lesson::LessonStatusItem, progress::ProgressStatus};

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A course as listed in the catalog, with the caller's standing in it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub is_enrolled: bool,
    pub lesson_count: usize,
    pub completed_lessons: usize,
    /// Mean best score over the caller's progress rows in this course.
    pub average_score: u32,
    pub progress_percent: u32,
}

/// A course with its ordered lessons.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub is_enrolled: bool,
    pub lessons: Vec<LessonStatusItem>,
}

/// Minimal progress projection used for per-course aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonScore {
    pub lesson_id: i64,
    pub status: ProgressStatus,
    pub best_score: Option<i32>,
}
