// src/handlers/catalog.rs

use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        course::{Course, CourseDetail, CourseSummary, LessonScore},
        enrollment::Enrollment,
        lesson::{Lesson, LessonDetail, LessonStatusItem},
        question::PublicQuestion,
    },
    repository::{PgStore, ProgressReader, QuestionSource},
    stats,
    utils::jwt::Claims,
};

/// Helper row: one of the caller's progress records with its course.
#[derive(sqlx::FromRow)]
struct CourseProgressRow {
    lesson_id: i64,
    course_id: i64,
    status: String,
    best_score: Option<i32>,
}

impl CourseProgressRow {
    fn score(&self) -> LessonScore {
        LessonScore {
            lesson_id: self.lesson_id,
            status: self.status.parse().unwrap_or_default(),
            best_score: self.best_score,
        }
    }
}

async fn find_course(pool: &PgPool, id: i64) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>("SELECT id, title, description, created_at FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

async fn is_enrolled(pool: &PgPool, user_id: i64, course_id: i64) -> Result<bool, AppError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Lists every course with the caller's enrollment and progress in it.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, description = "Course catalog", body = [CourseSummary])),
    security(("jwt" = [])),
    tag = "Catalog"
)]
pub async fn list_courses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let courses_query = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, created_at FROM courses ORDER BY id",
    )
    .fetch_all(&pool);
    let enrollments_query = sqlx::query_as::<_, (i64,)>(
        "SELECT course_id FROM enrollments WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(&pool);
    let lessons_query = sqlx::query_as::<_, (i64, i64)>("SELECT id, course_id FROM lessons")
        .fetch_all(&pool);
    let progress_query = sqlx::query_as::<_, CourseProgressRow>(
        r#"
        SELECT lp.lesson_id, l.course_id, lp.status, lp.best_score
        FROM lesson_progress lp
        JOIN lessons l ON l.id = lp.lesson_id
        WHERE lp.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool);

    let (courses, enrollments, lessons, progress) =
        tokio::try_join!(courses_query, enrollments_query, lessons_query, progress_query)
            .map_err(|e| {
                tracing::error!("Failed to load catalog: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

    let enrolled: HashSet<i64> = enrollments.into_iter().map(|(course_id,)| course_id).collect();

    let mut lesson_counts: HashMap<i64, usize> = HashMap::new();
    for (_, course_id) in &lessons {
        *lesson_counts.entry(*course_id).or_default() += 1;
    }

    let mut progress_by_course: HashMap<i64, Vec<LessonScore>> = HashMap::new();
    for row in &progress {
        progress_by_course.entry(row.course_id).or_default().push(row.score());
    }

    let summaries: Vec<CourseSummary> = courses
        .into_iter()
        .map(|course| {
            let id = course.id;
            stats::course_summary(
                course,
                enrolled.contains(&id),
                lesson_counts.get(&id).copied().unwrap_or(0),
                progress_by_course.get(&id).map(Vec::as_slice).unwrap_or(&[]),
            )
        })
        .collect();

    Ok(Json(summaries))
}

/// Retrieves a course with its ordered lessons and the caller's status on each.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetail),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Catalog"
)]
pub async fn get_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = find_course(&pool, id).await?;

    let lessons: Vec<Lesson> = sqlx::query_as(
        r#"
        SELECT id, course_id, title, content, order_index
        FROM lessons
        WHERE course_id = $1
        ORDER BY order_index ASC, id ASC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let progress: Vec<CourseProgressRow> = sqlx::query_as(
        r#"
        SELECT lp.lesson_id, l.course_id, lp.status, lp.best_score
        FROM lesson_progress lp
        JOIN lessons l ON l.id = lp.lesson_id
        WHERE lp.user_id = $1 AND l.course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let statuses: HashMap<i64, LessonScore> = progress
        .iter()
        .map(|row| (row.lesson_id, row.score()))
        .collect();

    let lessons = lessons
        .into_iter()
        .map(|lesson| LessonStatusItem {
            status: statuses
                .get(&lesson.id)
                .map(|p| p.status)
                .unwrap_or_default(),
            id: lesson.id,
            title: lesson.title,
            order_index: lesson.order_index,
        })
        .collect();

    Ok(Json(CourseDetail {
        is_enrolled: is_enrolled(&pool, user_id, id).await?,
        course,
        lessons,
    }))
}

/// Enrolls the caller in a course.
///
/// Returns 201 with the new enrollment, or 200 with the existing one.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 200, description = "Already enrolled", body = Enrollment),
        (status = 404, description = "Course not found")
    ),
    security(("jwt" = [])),
    tag = "Catalog"
)]
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    find_course(&pool, course_id).await?;

    let created: Option<Enrollment> = sqlx::query_as(
        r#"
        INSERT INTO enrollments (user_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, course_id) DO NOTHING
        RETURNING id, user_id, course_id, enrolled_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to enroll user {} in course {}: {:?}", user_id, course_id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    if let Some(enrollment) = created {
        tracing::info!("User {} enrolled in course {}", user_id, course_id);
        return Ok((StatusCode::CREATED, Json(enrollment)));
    }

    let existing: Enrollment = sqlx::query_as(
        r#"
        SELECT id, user_id, course_id, enrolled_at
        FROM enrollments
        WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::OK, Json(existing)))
}

/// Retrieves a lesson with its quiz questions (answer keys hidden) and the caller's progress.
#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson detail", body = LessonDetail),
        (status = 404, description = "Lesson not found")
    ),
    security(("jwt" = [])),
    tag = "Catalog"
)]
pub async fn get_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let lesson: Lesson = sqlx::query_as(
        "SELECT id, course_id, title, content, order_index FROM lessons WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    let store = PgStore::new(pool);
    let questions = store
        .lesson_questions(id)
        .await?
        .iter()
        .map(PublicQuestion::hidden)
        .collect();
    let progress = store.prior_progress(user_id, id).await?;

    Ok(Json(LessonDetail {
        lesson,
        questions,
        progress,
    }))
}
