//! Periodic background loops with cooperative shutdown.

use mindia_error::{MindiaResult, SchedulerError, SchedulerErrorKind};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A spawned loop that runs `work` once per period until stopped.
///
/// Stopping never interrupts a running iteration; the loop exits the next
/// time it waits for its timer.
#[derive(Debug)]
pub struct BackgroundHandle {
    name: &'static str,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl BackgroundHandle {
    /// Spawn a loop named `name`. The first iteration runs immediately.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut work: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tracing::info!(worker = name, period_ms = period.as_millis() as u64, "Worker started");
            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => work().await,
                }
            }
            tracing::info!(worker = name, "Worker stopped");
        });

        Self { name, token, join }
    }

    /// Name given at spawn time.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the loop is still running.
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Token that stops the loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Ask the loop to stop and wait for the current iteration to finish.
    ///
    /// # Errors
    ///
    /// Returns `Shutdown` if the loop panicked.
    pub async fn stop(self) -> MindiaResult<()> {
        let name = self.name;
        self.token.cancel();
        self.join.await.map_err(|e| {
            tracing::error!(worker = name, error = %e, "Worker did not stop cleanly");
            SchedulerError::new(SchedulerErrorKind::Shutdown).into()
        })
    }
}
