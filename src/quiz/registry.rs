// src/quiz/registry.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

use crate::quiz::{
    controller::{QuizController, SessionContext},
    ticker::Ticker,
};

/// How often expired sessions are swept.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// When a session leaves the registry without being discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Sessions untouched for this long are dropped.
    pub idle: Duration,
    /// Settled sessions only linger this long, enough to read the result.
    pub settled: Duration,
}

impl Expiry {
    fn is_due(&self, entry: &Entry, now: Instant) -> bool {
        let idle_for = now.saturating_duration_since(entry.touched);
        idle_for >= self.idle || (entry.controller.is_settled() && idle_for >= self.settled)
    }
}

struct Entry {
    controller: Arc<QuizController>,
    touched: Instant,
}

type Sessions = HashMap<SessionContext, Entry>;

/// Live quiz controllers, one per `(user, lesson)`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<Sessions>>,
    sweeper: Option<Arc<Ticker>>,
}

impl SessionRegistry {
    /// A registry that only shrinks on `discard` or `sweep`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that sweeps expired sessions every [`SWEEP_PERIOD`].
    /// Must be called from within a Tokio runtime.
    pub fn with_expiry(expiry: Expiry) -> Self {
        let sessions = Arc::new(Mutex::new(Sessions::new()));
        let sweeper = Ticker::every(SWEEP_PERIOD, Arc::downgrade(&sessions), move |sessions: &mut Sessions| {
            let swept = evict(sessions, expiry, Instant::now());
            if swept > 0 {
                tracing::debug!("Swept {} expired quiz sessions, {} left", swept, sessions.len());
            }
            true
        });

        Self {
            sessions,
            sweeper: Some(Arc::new(sweeper)),
        }
    }

    /// Looks up a controller and marks it as used.
    pub async fn get(&self, ctx: &SessionContext) -> Option<Arc<QuizController>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(ctx)?;
        entry.touched = Instant::now();
        Some(entry.controller.clone())
    }

    /// Keeps an already registered controller if another request won the race.
    pub async fn insert(&self, controller: QuizController) -> Arc<QuizController> {
        let ctx = controller.context();
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(ctx).or_insert_with(|| Entry {
            controller: Arc::new(controller),
            touched: now,
        });
        entry.touched = now;
        entry.controller.clone()
    }

    /// Drops the controller. Its countdown stops once the last handle is gone.
    pub async fn discard(&self, ctx: &SessionContext) -> bool {
        self.sessions.lock().await.remove(ctx).is_some()
    }

    /// Drops every expired session now and returns how many went.
    pub async fn sweep(&self, expiry: Expiry) -> usize {
        let mut sessions = self.sessions.lock().await;
        evict(&mut sessions, expiry, Instant::now())
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|ticker| !ticker.is_finished())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn evict(sessions: &mut Sessions, expiry: Expiry, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| !expiry.is_due(entry, now));
    before - sessions.len()
}
