// src/repository/mod.rs

//! Read/write seams between the quiz controller and storage.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        progress::{PriorProgress, ProgressUpsert},
        question::Question,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Supplies the ordered question set of a lesson's quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Returns `AppError::NotFound` when the lesson does not exist and an
    /// empty list when it has no quiz.
    async fn lesson_questions(&self, lesson_id: i64) -> Result<Vec<Question>, AppError>;
}

/// Reads the caller's progress for a lesson before a session starts.
#[async_trait]
pub trait ProgressReader: Send + Sync {
    async fn prior_progress(&self, user_id: i64, lesson_id: i64) -> Result<Option<PriorProgress>, AppError>;
}

/// Upserts progress keyed by `(user_id, lesson_id)`; the last write wins.
#[async_trait]
pub trait ProgressWriter: Send + Sync {
    async fn upsert_progress(&self, update: &ProgressUpsert) -> Result<(), AppError>;
}
