// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::course::Course;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub enrolled_courses: usize,
    pub completed_lessons: usize,
    pub completion_rate: u32,
    pub average_score: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub courses: Vec<Course>,
}

/// Result of waiting on the progress change feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardChange {
    pub changed: bool,
    pub stats: DashboardStats,
}
