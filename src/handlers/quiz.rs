// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    quiz::{QuizOpen, QuizService, SessionContext, SessionView},
    utils::jwt::Claims,
};

/// DTO for selecting an option.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectAnswerRequest {
    pub question_id: i64,
    pub option_index: usize,
}

fn context(claims: &Claims, lesson_id: i64) -> Result<SessionContext, AppError> {
    Ok(SessionContext {
        user_id: claims.user_id()?,
        lesson_id,
    })
}

/// Opens the caller's quiz session for a lesson, creating it if needed.
///
/// A lesson without questions yields `available: false` and no session.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/quiz",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Session view or empty state", body = QuizOpen),
        (status = 404, description = "Lesson not found")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn open_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.open(ctx).await?))
}

#[utoipa::path(
    get,
    path = "/api/lessons/{id}/quiz",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn get_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.view(ctx).await?))
}

/// Starts the countdown. Refusals come back as a notice on the view.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/quiz/start",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn start_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.start(ctx).await?))
}

#[utoipa::path(
    put,
    path = "/api/lessons/{id}/quiz/answers",
    params(("id" = i64, Path, description = "Lesson ID")),
    request_body = SelectAnswerRequest,
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn select_answer(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.select(ctx, req.question_id, req.option_index).await?))
}

/// Grades and locks the attempt, then records progress.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/quiz/submit",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Session view with score", body = SessionView),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn submit_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.submit(ctx).await?))
}

#[utoipa::path(
    post,
    path = "/api/lessons/{id}/quiz/retry-save",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Session view", body = SessionView),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn retry_save(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    Ok(Json(quiz.retry_save(ctx).await?))
}

/// Discards the session. Nothing is persisted.
#[utoipa::path(
    delete,
    path = "/api/lessons/{id}/quiz",
    params(("id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "No open session")
    ),
    security(("jwt" = [])),
    tag = "Quiz"
)]
pub async fn discard_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, lesson_id)?;
    if quiz.discard(ctx).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("No quiz session open for this lesson".to_string()))
    }
}
