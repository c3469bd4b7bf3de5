// src/quiz/ticker.rs

use std::sync::Weak;
use std::time::Duration;

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

/// A periodic task driving state it does not own.
///
/// The task only keeps a weak handle: once the target is gone the ticker
/// stops on its own. Dropping the `Ticker` aborts the task.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Period of the quiz countdown.
    pub const SECOND: Duration = Duration::from_secs(1);

    /// Calls `tick` once per second until it returns `false` or the target is dropped.
    pub fn spawn<T, F>(target: Weak<Mutex<T>>, tick: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(&mut T) -> bool + Send + 'static,
    {
        Self::every(Self::SECOND, target, tick)
    }

    /// Calls `tick` every `period`, first after one full period.
    pub fn every<T, F>(period: Duration, target: Weak<Mutex<T>>, mut tick: F) -> Self
    where
        T: Send + 'static,
        F: FnMut(&mut T) -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(target) = target.upgrade() else {
                    tracing::debug!("Ticker target dropped, stopping");
                    break;
                };
                let keep_going = {
                    let mut guard = target.lock().await;
                    tick(&mut *guard)
                };
                if !keep_going {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
