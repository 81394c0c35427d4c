//! Task queue and task record capabilities.

use async_trait::async_trait;
use mindia_core::Task;
use mindia_error::MindiaResult;
use uuid::Uuid;

/// FIFO queue polled by the scheduler.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a task.
    async fn enqueue(&self, task: Task) -> MindiaResult<()>;

    /// Pop the oldest task, or `None` when the queue is empty.
    async fn dequeue(&self) -> MindiaResult<Option<Task>>;
}

/// Record-oriented task store used for inspection.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All known task records.
    async fn get_all(&self) -> MindiaResult<Vec<Task>>;

    /// Task with `id`, if recorded.
    async fn get(&self, id: &Uuid) -> MindiaResult<Option<Task>>;

    /// Insert or replace a task record.
    async fn save(&self, task: &Task) -> MindiaResult<()>;

    /// Remove a task record.
    async fn delete(&self, id: &Uuid) -> MindiaResult<()>;
}
