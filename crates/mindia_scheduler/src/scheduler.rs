//! The polling task scheduler.

use crate::{BackgroundHandle, PluginRegistry};
use derive_getters::Getters;
use mindia_core::Task;
use mindia_error::MindiaResult;
use mindia_interface::{TaskQueue, TaskRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;

/// Polling cadence and batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_builder::Builder)]
pub struct SchedulerConfig {
    /// Time between polls
    #[builder(default = "Duration::from_secs(10)")]
    poll_interval: Duration,
    /// Most tasks dequeued in one poll
    #[builder(default = "16")]
    max_tasks_per_tick: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_tasks_per_tick: 16,
        }
    }
}

/// What one poll did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks taken off the queue
    pub dequeued: usize,
    /// Tasks handed to their plugin
    pub dispatched: usize,
    /// Tasks nobody handles
    pub dropped: usize,
}

/// Dispatches queued tasks to plugins.
///
/// Each dequeued task runs on its own tokio task and settles its own outcome.
/// A tick only dequeues and dispatches, so a plugin stuck on a slow remote
/// service holds up its task and nothing else. [`drain`](Self::drain) waits
/// for the tasks still in flight.
pub struct TaskScheduler {
    store: TaskOutcomes,
    plugins: Arc<PluginRegistry>,
    config: SchedulerConfig,
    in_flight: TaskTracker,
}

impl TaskScheduler {
    /// Scheduler over `queue`, keeping task records in `records`.
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        records: Arc<dyn TaskRepository>,
        plugins: PluginRegistry,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store: TaskOutcomes { queue, records },
            plugins: Arc::new(plugins),
            config,
            in_flight: TaskTracker::new(),
        }
    }

    /// Registered plugins.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Number of plugin runs that have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Record and queue a task.
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, task_name = %task.name))]
    pub async fn submit(&self, task: Task) -> MindiaResult<()> {
        self.store.records.save(&task).await?;
        self.store.queue.enqueue(task).await?;
        tracing::debug!("Task submitted");
        Ok(())
    }

    /// Poll once and dispatch every task taken.
    ///
    /// Returns without waiting for the plugins. A task whose name has no
    /// plugin is removed from the queue and recorded as canceled.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        for _ in 0..self.config.max_tasks_per_tick {
            let task = match self.store.queue.dequeue().await {
                Ok(Some(task)) => task,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to dequeue task");
                    break;
                }
            };
            report.dequeued += 1;

            let Some(plugin) = self.plugins.get(&task.name) else {
                tracing::warn!(task_id = %task.id, task_name = %task.name, "No plugin for task, dropping it");
                report.dropped += 1;
                self.store.drop_unhandled(task).await;
                continue;
            };

            let store = self.store.clone();
            self.in_flight.spawn(async move {
                let snapshot = task.clone();
                let outcome = plugin.execute(task).await;
                store.settle(snapshot, outcome).await;
            });
            report.dispatched += 1;
        }

        if report.dequeued > 0 {
            tracing::info!(?report, in_flight = self.in_flight.len(), "Scheduler tick");
        }
        report
    }

    /// Wait until every dispatched plugin run has settled.
    #[tracing::instrument(skip(self), fields(in_flight = self.in_flight.len()))]
    pub async fn drain(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        self.in_flight.reopen();
        tracing::debug!("Scheduler drained");
    }

    /// Poll every `poll_interval` until the returned handle is stopped.
    ///
    /// Stopping the handle ends polling; call [`drain`](Self::drain) to wait
    /// for runs already dispatched.
    pub fn start(self: Arc<Self>) -> BackgroundHandle {
        let period = self.config.poll_interval;
        BackgroundHandle::spawn("task-scheduler", period, move || {
            let scheduler = Arc::clone(&self);
            async move {
                scheduler.tick().await;
            }
        })
    }
}

/// Where plugin outcomes are written back.
#[derive(Clone)]
struct TaskOutcomes {
    queue: Arc<dyn TaskQueue>,
    records: Arc<dyn TaskRepository>,
}

impl TaskOutcomes {
    async fn drop_unhandled(&self, mut task: Task) {
        let id = task.id;
        task.cancel();
        task.error = Some(format!("no plugin registered for task '{}'", task.name));
        if let Err(e) = self.records.save(&task).await {
            tracing::error!(task_id = %id, error = %e, "Failed to record dropped task");
        }
    }

    async fn settle(&self, snapshot: Task, outcome: MindiaResult<Option<Task>>) {
        let id = snapshot.id;
        let stored = match outcome {
            Ok(Some(task)) if task.status.is_terminal() => {
                tracing::info!(task_id = %id, status = %task.status, "Task completed");
                self.records.save(&task).await
            }
            Ok(Some(task)) => match self.records.save(&task).await {
                Ok(()) => self.queue.enqueue(task).await,
                Err(e) => Err(e),
            },
            Ok(None) => {
                tracing::info!(task_id = %id, "Task retired");
                self.records.delete(&id).await
            }
            Err(e) => {
                tracing::error!(task_id = %id, task_name = %snapshot.name, error = %e, "Plugin failed");
                let mut failed = snapshot;
                failed.finish(Some(e.to_string()));
                self.records.save(&failed).await
            }
        };

        if let Err(e) = stored {
            tracing::error!(task_id = %id, error = %e, "Failed to store task outcome");
        }
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("plugins", &self.plugins)
            .field("config", &self.config)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
