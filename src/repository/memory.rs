// src/repository/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        progress::{PriorProgress, ProgressUpsert},
        question::Question,
    },
    repository::{ProgressReader, ProgressWriter, QuestionSource},
};

/// In-process store for lessons and progress.
/// Writes can be made to fail on demand to exercise unconfirmed saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lessons: RwLock<HashMap<i64, Vec<Question>>>,
    progress: RwLock<HashMap<(i64, i64), ProgressUpsert>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_lesson(&self, lesson_id: i64, questions: Vec<Question>) {
        self.lessons.write().await.insert(lesson_id, questions);
    }

    pub async fn insert_progress(&self, record: ProgressUpsert) {
        self.progress
            .write()
            .await
            .insert((record.user_id, record.lesson_id), record);
    }

    pub async fn progress(&self, user_id: i64, lesson_id: i64) -> Option<ProgressUpsert> {
        self.progress.read().await.get(&(user_id, lesson_id)).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionSource for MemoryStore {
    async fn lesson_questions(&self, lesson_id: i64) -> Result<Vec<Question>, AppError> {
        self.lessons
            .read()
            .await
            .get(&lesson_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))
    }
}

#[async_trait]
impl ProgressReader for MemoryStore {
    async fn prior_progress(&self, user_id: i64, lesson_id: i64) -> Result<Option<PriorProgress>, AppError> {
        Ok(self.progress(user_id, lesson_id).await.map(|record| PriorProgress {
            best_score: Some(record.best_score),
            status: Some(record.status),
        }))
    }
}

#[async_trait]
impl ProgressWriter for MemoryStore {
    async fn upsert_progress(&self, update: &ProgressUpsert) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError("progress store unavailable".to_string()));
        }
        self.insert_progress(update.clone()).await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
