//! Task queues with attached task records.

use crate::JsonDocument;
use async_trait::async_trait;
use mindia_core::Task;
use mindia_error::MindiaResult;
use mindia_interface::{TaskQueue, TaskRepository};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskState {
    queue: VecDeque<Task>,
    records: BTreeMap<Uuid, Task>,
}

/// In-memory FIFO queue plus task records. Clones share the same state.
///
/// # Examples
///
/// ```
/// use mindia_storage::MemoryTaskStore;
///
/// let store = MemoryTaskStore::new();
/// assert_eq!(store.queued(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    state: Arc<Mutex<TaskState>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting in the queue.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskStore {
    async fn enqueue(&self, task: Task) -> MindiaResult<()> {
        self.state.lock().queue.push_back(task);
        Ok(())
    }

    async fn dequeue(&self) -> MindiaResult<Option<Task>> {
        Ok(self.state.lock().queue.pop_front())
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn get_all(&self) -> MindiaResult<Vec<Task>> {
        Ok(self.state.lock().records.values().cloned().collect())
    }

    async fn get(&self, id: &Uuid) -> MindiaResult<Option<Task>> {
        Ok(self.state.lock().records.get(id).cloned())
    }

    async fn save(&self, task: &Task) -> MindiaResult<()> {
        self.state.lock().records.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> MindiaResult<()> {
        self.state.lock().records.remove(id);
        Ok(())
    }
}

/// Queue plus task records persisted as one JSON document, so tasks
/// enqueued by one process can be picked up by another.
#[derive(Debug)]
pub struct JsonTaskStore {
    document: JsonDocument<TaskState>,
}

impl JsonTaskStore {
    /// Store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }
}

#[async_trait]
impl TaskQueue for JsonTaskStore {
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, name = %task.name))]
    async fn enqueue(&self, task: Task) -> MindiaResult<()> {
        self.document
            .update(move |state| state.queue.push_back(task))
            .await
    }

    async fn dequeue(&self) -> MindiaResult<Option<Task>> {
        if self.document.load().await?.queue.is_empty() {
            return Ok(None);
        }
        self.document.update(|state| state.queue.pop_front()).await
    }
}

#[async_trait]
impl TaskRepository for JsonTaskStore {
    async fn get_all(&self) -> MindiaResult<Vec<Task>> {
        Ok(self.document.load().await?.records.into_values().collect())
    }

    async fn get(&self, id: &Uuid) -> MindiaResult<Option<Task>> {
        Ok(self.document.load().await?.records.remove(id))
    }

    async fn save(&self, task: &Task) -> MindiaResult<()> {
        self.document
            .update(|state| {
                state.records.insert(task.id, task.clone());
            })
            .await
    }

    async fn delete(&self, id: &Uuid) -> MindiaResult<()> {
        self.document
            .update(|state| {
                state.records.remove(id);
            })
            .await
    }
}
