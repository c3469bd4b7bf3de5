// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{config::Config, events::ProgressFeed, quiz::QuizService, repository::PgStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub quiz: QuizService,
    pub feed: ProgressFeed,
}

impl AppState {
    /// Wires the PostgreSQL store behind every quiz seam.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let feed = ProgressFeed::default();
        let quiz = QuizService::new(
            store.clone(),
            store.clone(),
            store,
            feed.clone(),
            config.quiz.clone(),
        );

        Self {
            pool,
            config,
            quiz,
            feed,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizService {
    fn from_ref(state: &AppState) -> Self {
        state.quiz.clone()
    }
}

impl FromRef<AppState> for ProgressFeed {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}
