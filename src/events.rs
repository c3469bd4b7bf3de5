// src/events.rs

//! Push-based feed of confirmed progress writes.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::progress::ProgressStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressChanged {
    pub user_id: i64,
    pub lesson_id: i64,
    pub status: ProgressStatus,
    pub best_score: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ProgressFeed {
    tx: broadcast::Sender<ProgressChanged>,
}

impl ProgressFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: ProgressChanged) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribes to events matching `predicate`. Dropping the subscription unsubscribes.
    pub fn subscribe<F>(&self, predicate: F) -> Subscription
    where
        F: Fn(&ProgressChanged) -> bool + Send + Sync + 'static,
    {
        Subscription {
            rx: self.tx.subscribe(),
            predicate: Box::new(predicate),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ProgressFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<ProgressChanged>,
    predicate: Box<dyn Fn(&ProgressChanged) -> bool + Send + Sync>,
}

impl Subscription {
    /// Waits for the next matching event. `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<ProgressChanged> {
        loop {
            match self.rx.recv().await {
                Ok(event) if (self.predicate)(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Progress subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(user_id: i64, lesson_id: i64) -> ProgressChanged {
        ProgressChanged {
            user_id,
            lesson_id,
            status: ProgressStatus::Completed,
            best_score: Some(100),
        }
    }

    #[tokio::test]
    async fn subscriber_only_sees_matching_events() {
        let feed = ProgressFeed::default();
        let mut mine = feed.subscribe(|e| e.user_id == 1);

        feed.publish(change(2, 10));
        feed.publish(change(1, 11));

        assert_eq!(mine.next().await, Some(change(1, 11)));
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let feed = ProgressFeed::default();
        let sub = feed.subscribe(|_| true);
        assert_eq!(feed.subscriber_count(), 1);

        drop(sub);
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.publish(change(1, 1)), 0);
    }
}
