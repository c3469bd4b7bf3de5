// src/handlers/dashboard.rs

use std::collections::HashSet;
use std::time::Duration;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::IntoParams;

use crate::{
    error::AppError,
    events::ProgressFeed,
    models::{
        course::{Course, LessonScore},
        dashboard::{DashboardChange, DashboardResponse, DashboardStats},
        progress::ProgressRow,
    },
    stats,
    utils::jwt::Claims,
};

const DEFAULT_WAIT_SECS: u64 = 25;
const MAX_WAIT_SECS: u64 = 60;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChangesParams {
    /// Seconds to wait for a change, clamped to 1..=60.
    pub timeout_secs: Option<u64>,
}

async fn load_dashboard(pool: &PgPool, user_id: i64) -> Result<(DashboardStats, Vec<Course>), AppError> {
    let courses_query = sqlx::query_as::<_, Course>(
        r#"
        SELECT c.id, c.title, c.description, c.created_at
        FROM courses c
        JOIN enrollments e ON e.course_id = c.id
        WHERE e.user_id = $1
        ORDER BY e.enrolled_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool);
    let lessons_query = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT l.id
        FROM lessons l
        JOIN enrollments e ON e.course_id = l.course_id
        WHERE e.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool);
    let progress_query = sqlx::query_as::<_, ProgressRow>(
        "SELECT lesson_id, status, best_score FROM lesson_progress WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool);

    let (courses, lessons, progress) = tokio::try_join!(courses_query, lessons_query, progress_query)
        .map_err(|e| {
            tracing::error!("Failed to load dashboard: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let enrolled_lessons: HashSet<i64> = lessons.into_iter().map(|(id,)| id).collect();
    let scores: Vec<LessonScore> = progress
        .iter()
        .map(|row| LessonScore {
            lesson_id: row.lesson_id,
            status: row.status(),
            best_score: row.best_score,
        })
        .collect();

    let stats = stats::dashboard_stats(courses.len(), &enrolled_lessons, &scores);
    Ok((stats, courses))
}

/// Returns the caller's learning statistics and enrolled courses.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Dashboard", body = DashboardResponse)),
    security(("jwt" = [])),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let (stats, courses) = load_dashboard(&pool, user_id).await?;
    Ok(Json(DashboardResponse { stats, courses }))
}

/// Long-polls for the caller's next progress change, then returns fresh stats.
#[utoipa::path(
    get,
    path = "/api/dashboard/changes",
    params(ChangesParams),
    responses((status = 200, description = "Change notification", body = DashboardChange)),
    security(("jwt" = [])),
    tag = "Dashboard"
)]
pub async fn wait_for_changes(
    State(pool): State<PgPool>,
    State(feed): State<ProgressFeed>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ChangesParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let wait = params
        .timeout_secs
        .unwrap_or(DEFAULT_WAIT_SECS)
        .clamp(1, MAX_WAIT_SECS);

    let mut subscription = feed.subscribe(move |event| event.user_id == user_id);
    let changed = matches!(
        tokio::time::timeout(Duration::from_secs(wait), subscription.next()).await,
        Ok(Some(_))
    );
    drop(subscription);

    let (stats, _) = load_dashboard(&pool, user_id).await?;
    Ok(Json(DashboardChange { changed, stats }))
}
