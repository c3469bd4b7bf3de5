// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{
    progress::{PriorProgress, ProgressStatus},
    question::PublicQuestion,
};

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: String,
    pub order_index: i32,
}

/// Lesson entry of a course page, with the caller's status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonStatusItem {
    pub id: i64,
    pub title: String,
    pub order_index: i32,
    pub status: ProgressStatus,
}

/// Full lesson page: content, quiz questions (answer keys hidden) and prior progress.
#[derive(Debug, Serialize, ToSchema)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub questions: Vec<PublicQuestion>,
    pub progress: Option<PriorProgress>,
}
