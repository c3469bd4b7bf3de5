// src/quiz/controller.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::{
    config::QuizSettings,
    events::{ProgressChanged, ProgressFeed},
    models::{
        progress::{PriorProgress, ProgressUpsert},
        question::{PublicQuestion, Question},
    },
    quiz::{
        notice::{Notice, NoticeBoard},
        score::Score,
        session::{Phase, QuizSession, SessionError, format_clock},
        ticker::Ticker,
    },
    repository::ProgressWriter,
};

/// Identifies whose attempt at which lesson a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionContext {
    pub user_id: i64,
    pub lesson_id: i64,
}

/// Where the progress write of a submitted attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    NotRequested,
    Pending,
    Confirmed,
    Unconfirmed,
}

/// Snapshot of a session for rendering.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub lesson_id: i64,
    pub phase: Phase,
    pub locked: bool,
    pub show_answers: bool,
    pub question_count: usize,
    pub time_budget_seconds: u32,
    pub remaining_seconds: Option<u32>,
    /// `m:ss`, only while time is left.
    pub clock: Option<String>,
    pub expired: bool,
    pub questions: Vec<PublicQuestion>,
    pub answers: BTreeMap<i64, usize>,
    pub score: Option<Score>,
    pub notice: Option<Notice>,
    pub persistence: Persistence,
}

struct Inner {
    session: QuizSession,
    notices: NoticeBoard,
    persistence: Persistence,
    record: Option<ProgressUpsert>,
    countdown: Option<Ticker>,
}

impl Inner {
    fn refuse(&mut self, err: SessionError) {
        tracing::debug!("Quiz transition refused: {}", err);
        self.notices.post(Notice::info(err.to_string()));
    }
}

/// Drives one quiz attempt: the session state machine, its countdown,
/// its notices, and the progress write issued on submission.
pub struct QuizController {
    ctx: SessionContext,
    inner: Arc<Mutex<Inner>>,
    writer: Arc<dyn ProgressWriter>,
    feed: ProgressFeed,
    settled: AtomicBool,
}

impl QuizController {
    /// Returns `None` when there are no questions to attempt.
    pub fn new(
        ctx: SessionContext,
        questions: Vec<Question>,
        prior: &PriorProgress,
        settings: &QuizSettings,
        writer: Arc<dyn ProgressWriter>,
        feed: ProgressFeed,
    ) -> Option<Self> {
        let session = QuizSession::new(questions, prior, settings)?;
        let inner = Inner {
            session,
            notices: NoticeBoard::new(Duration::from_secs(settings.notice_ttl_secs)),
            persistence: Persistence::NotRequested,
            record: None,
            countdown: None,
        };

        Some(Self {
            ctx,
            inner: Arc::new(Mutex::new(inner)),
            writer,
            feed,
            settled: AtomicBool::new(false),
        })
    }

    pub fn context(&self) -> SessionContext {
        self.ctx
    }

    /// Submitted and confirmed. Reopening the lesson rebuilds the same locked
    /// view from stored progress, so nothing is lost by dropping it.
    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    pub async fn view(&self) -> SessionView {
        let inner = self.inner.lock().await;
        self.render(&inner)
    }

    pub async fn start(&self) -> SessionView {
        let mut inner = self.inner.lock().await;
        match inner.session.start() {
            Ok(seconds) => {
                tracing::info!(
                    "Quiz started for user {} lesson {} ({}s)",
                    self.ctx.user_id,
                    self.ctx.lesson_id,
                    seconds
                );
                inner.countdown = Some(Ticker::spawn(Arc::downgrade(&self.inner), |inner: &mut Inner| {
                    inner.session.tick()
                }));
            }
            Err(err) => inner.refuse(err),
        }
        self.render(&inner)
    }

    pub async fn select(&self, question_id: i64, option: usize) -> SessionView {
        let mut inner = self.inner.lock().await;
        if let Err(err) = inner.session.select(question_id, option) {
            inner.refuse(err);
        }
        self.render(&inner)
    }

    /// Grades and locks the attempt, then writes progress.
    /// The local result stands even if the write fails.
    pub async fn submit(&self) -> SessionView {
        let record = {
            let mut inner = self.inner.lock().await;
            let submission = match inner.session.begin_submit() {
                Ok(_) => inner.session.finish_submit(),
                Err(err) => Err(err),
            };
            let submission = match submission {
                Ok(submission) => submission,
                Err(err) => {
                    inner.refuse(err);
                    return self.render(&inner);
                }
            };

            inner.countdown = None;
            let record = ProgressUpsert {
                user_id: self.ctx.user_id,
                lesson_id: self.ctx.lesson_id,
                status: submission.status,
                best_score: i32::try_from(submission.score.percentage).unwrap_or(100),
            };
            inner.record = Some(record.clone());
            inner.persistence = Persistence::Pending;

            let notice = if submission.score.passed {
                Notice::success(submission.score.message())
            } else {
                Notice::info(submission.score.message())
            };
            inner.notices.post(notice);
            record
        };

        self.persist(record).await
    }

    /// Re-issues the same progress write after a failure. Nothing is re-graded.
    pub async fn retry_save(&self) -> SessionView {
        let record = {
            let mut inner = self.inner.lock().await;
            match (inner.persistence, inner.record.clone()) {
                (Persistence::Unconfirmed, Some(record)) => {
                    inner.persistence = Persistence::Pending;
                    record
                }
                _ => {
                    inner.notices.post(Notice::info("Nothing to save."));
                    return self.render(&inner);
                }
            }
        };

        self.persist(record).await
    }

    async fn persist(&self, record: ProgressUpsert) -> SessionView {
        let result = self.writer.upsert_progress(&record).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(()) => {
                inner.persistence = Persistence::Confirmed;
                self.settled.store(true, Ordering::Release);
                self.feed.publish(ProgressChanged {
                    user_id: record.user_id,
                    lesson_id: record.lesson_id,
                    status: record.status,
                    best_score: Some(record.best_score),
                });
            }
            Err(err) => {
                tracing::error!(
                    "Failed to record progress for user {} lesson {}: {}",
                    record.user_id,
                    record.lesson_id,
                    err
                );
                inner.persistence = Persistence::Unconfirmed;
                let message = match inner.session.score() {
                    Some(score) => format!("{}, but your progress could not be saved. Please retry.", score.message()),
                    None => "Your progress could not be saved. Please retry.".to_string(),
                };
                inner.notices.post(Notice::error(message));
            }
        }
        self.render(&inner)
    }

    fn render(&self, inner: &Inner) -> SessionView {
        let session = &inner.session;
        let show_answers = session.show_answers();
        let questions = match (show_answers, session.phase()) {
            (true, _) => session.questions().iter().map(PublicQuestion::revealed).collect(),
            (false, Phase::InProgress) => session.questions().iter().map(PublicQuestion::hidden).collect(),
            _ => Vec::new(),
        };
        let remaining = session.remaining_seconds();

        SessionView {
            lesson_id: self.ctx.lesson_id,
            phase: session.phase(),
            locked: session.is_locked(),
            show_answers,
            question_count: session.questions().len(),
            time_budget_seconds: session.time_budget(),
            remaining_seconds: remaining,
            clock: remaining.filter(|s| *s > 0).map(format_clock),
            expired: session.is_expired(),
            questions,
            answers: session.answers().clone(),
            score: session.score(),
            notice: inner.notices.current().cloned(),
            persistence: inner.persistence,
        }
    }
}
