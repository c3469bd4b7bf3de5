// src/quiz/service.rs

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::QuizSettings,
    error::AppError,
    events::ProgressFeed,
    quiz::{
        controller::{QuizController, SessionContext, SessionView},
        registry::{Expiry, SessionRegistry},
    },
    repository::{ProgressReader, ProgressWriter, QuestionSource},
};

pub const NO_QUIZ_MESSAGE: &str = "No quiz available for this lesson.";

/// Response of opening a lesson's quiz.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizOpen {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

impl QuizOpen {
    fn empty() -> Self {
        Self {
            available: false,
            message: Some(NO_QUIZ_MESSAGE.to_string()),
            session: None,
        }
    }

    fn session(view: SessionView) -> Self {
        Self {
            available: true,
            message: None,
            session: Some(view),
        }
    }
}

/// Wires quiz controllers to their collaborators.
#[derive(Clone)]
pub struct QuizService {
    questions: Arc<dyn QuestionSource>,
    progress: Arc<dyn ProgressReader>,
    writer: Arc<dyn ProgressWriter>,
    feed: ProgressFeed,
    registry: SessionRegistry,
    settings: QuizSettings,
}

impl QuizService {
    /// Starts the session sweeper, so this must run inside a Tokio runtime.
    pub fn new(
        questions: Arc<dyn QuestionSource>,
        progress: Arc<dyn ProgressReader>,
        writer: Arc<dyn ProgressWriter>,
        feed: ProgressFeed,
        settings: QuizSettings,
    ) -> Self {
        Self {
            questions,
            progress,
            writer,
            feed,
            registry: SessionRegistry::with_expiry(Expiry {
                idle: Duration::from_secs(settings.session_idle_secs),
                settled: Duration::from_secs(settings.notice_ttl_secs),
            }),
            settings,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Returns the live session, or builds one from the lesson's questions
    /// and the caller's prior progress.
    pub async fn open(&self, ctx: SessionContext) -> Result<QuizOpen, AppError> {
        if let Some(controller) = self.registry.get(&ctx).await {
            return Ok(QuizOpen::session(controller.view().await));
        }

        let questions = self.questions.lesson_questions(ctx.lesson_id).await?;
        let prior = self
            .progress
            .prior_progress(ctx.user_id, ctx.lesson_id)
            .await?
            .unwrap_or_default();

        let Some(controller) = QuizController::new(
            ctx,
            questions,
            &prior,
            &self.settings,
            self.writer.clone(),
            self.feed.clone(),
        ) else {
            return Ok(QuizOpen::empty());
        };

        tracing::debug!("Opened quiz session for user {} lesson {}", ctx.user_id, ctx.lesson_id);
        let controller = self.registry.insert(controller).await;
        Ok(QuizOpen::session(controller.view().await))
    }

    pub async fn view(&self, ctx: SessionContext) -> Result<SessionView, AppError> {
        Ok(self.live(&ctx).await?.view().await)
    }

    pub async fn start(&self, ctx: SessionContext) -> Result<SessionView, AppError> {
        Ok(self.live(&ctx).await?.start().await)
    }

    pub async fn select(&self, ctx: SessionContext, question_id: i64, option: usize) -> Result<SessionView, AppError> {
        Ok(self.live(&ctx).await?.select(question_id, option).await)
    }

    pub async fn submit(&self, ctx: SessionContext) -> Result<SessionView, AppError> {
        Ok(self.live(&ctx).await?.submit().await)
    }

    pub async fn retry_save(&self, ctx: SessionContext) -> Result<SessionView, AppError> {
        Ok(self.live(&ctx).await?.retry_save().await)
    }

    /// Tears the session down without persisting anything.
    pub async fn discard(&self, ctx: SessionContext) -> bool {
        let removed = self.registry.discard(&ctx).await;
        if removed {
            tracing::debug!("Discarded quiz session for user {} lesson {}", ctx.user_id, ctx.lesson_id);
        }
        removed
    }

    async fn live(&self, ctx: &SessionContext) -> Result<Arc<QuizController>, AppError> {
        self.registry
            .get(ctx)
            .await
            .ok_or_else(|| AppError::NotFound("No quiz session open for this lesson".to_string()))
    }
}
