// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        progress::{PriorProgress, ProgressRow, ProgressUpsert},
        question::{Question, QuestionRow},
    },
    repository::{ProgressReader, ProgressWriter, QuestionSource},
};

/// PostgreSQL-backed implementation of the quiz storage seams.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionSource for PgStore {
    async fn lesson_questions(&self, lesson_id: i64) -> Result<Vec<Question>, AppError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Lesson not found".to_string()));
        }

        // A lesson's quiz is its first quiz row.
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, quiz_id, question_text, options, correct_answer, order_index
            FROM quiz_questions
            WHERE quiz_id = (
                SELECT id FROM quizzes WHERE lesson_id = $1 ORDER BY id LIMIT 1
            )
            ORDER BY order_index ASC, id ASC
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz questions: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        rows.into_iter()
            .map(|row| {
                Question::try_from(row).map_err(|e| {
                    tracing::error!("Refusing to load quiz for lesson {}: {}", lesson_id, e);
                    AppError::InternalServerError(e.to_string())
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProgressReader for PgStore {
    async fn prior_progress(&self, user_id: i64, lesson_id: i64) -> Result<Option<PriorProgress>, AppError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            r#"
            SELECT lesson_id, status, best_score
            FROM lesson_progress
            WHERE user_id = $1 AND lesson_id = $2
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| PriorProgress {
            best_score: row.best_score,
            status: Some(row.status()),
        }))
    }
}

#[async_trait]
impl ProgressWriter for PgStore {
    async fn upsert_progress(&self, update: &ProgressUpsert) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (user_id, lesson_id, status, best_score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                status = EXCLUDED.status,
                best_score = EXCLUDED.best_score,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(update.user_id)
        .bind(update.lesson_id)
        .bind(update.status.as_str())
        .bind(update.best_score)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert lesson progress: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }
}
