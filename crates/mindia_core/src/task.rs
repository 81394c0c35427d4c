//! Scheduler tasks and their typed payloads.

use chrono::{DateTime, Utc};
use mindia_error::{JsonError, MindiaResult, SchedulerError, SchedulerErrorKind};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Lifecycle state of a task.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting in the queue
    #[default]
    #[display("enqueued")]
    Enqueued,
    /// An external job is running
    #[display("processing")]
    Processing,
    /// Completed, successfully or with an error
    #[display("finished")]
    Finished,
    /// Abandoned before completion
    #[display("canceled")]
    Canceled,
}

impl TaskStatus {
    /// Whether no further work will happen for the task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Finished | TaskStatus::Canceled)
    }
}

/// A plugin-specific payload schema.
///
/// The task name acts as the tag: a payload can only be read back from a
/// task carrying the same name.
pub trait TaskPayload: Serialize + DeserializeOwned {
    /// Name of the task kind, and of the plugin that executes it.
    const TASK_NAME: &'static str;
}

/// A unit of asynchronous work tracked by the scheduler.
///
/// # Examples
///
/// ```
/// use mindia_core::{Task, TaskPayload, TaskStatus};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Ping { count: u32 }
///
/// impl TaskPayload for Ping {
///     const TASK_NAME: &'static str = "ping";
/// }
///
/// let task = Task::new(&Ping { count: 3 }).unwrap();
/// assert_eq!(task.name, "ping");
/// assert_eq!(task.status, TaskStatus::Enqueued);
/// assert_eq!(task.payload::<Ping>().unwrap().count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: Uuid,
    /// Task kind, used to find the plugin
    pub name: String,
    /// Current state
    pub status: TaskStatus,
    /// Serialized payload owned by the plugin
    #[serde(default)]
    pub details: Vec<u8>,
    /// Failure description for tasks that finished unsuccessfully
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the task was created
    pub enqueued_at: DateTime<Utc>,
    /// When an external job was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an enqueued task carrying `payload`.
    pub fn new<P: TaskPayload>(payload: &P) -> MindiaResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: P::TASK_NAME.to_string(),
            status: TaskStatus::Enqueued,
            details: encode(payload)?,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        })
    }

    /// Decode the payload, checking that the task is of kind `P`.
    pub fn payload<P: TaskPayload>(&self) -> MindiaResult<P> {
        if self.name != P::TASK_NAME {
            return Err(SchedulerError::new(SchedulerErrorKind::PayloadMismatch {
                expected: P::TASK_NAME.to_string(),
                found: self.name.clone(),
            })
            .into());
        }
        serde_json::from_slice(&self.details).map_err(|e| {
            SchedulerError::new(SchedulerErrorKind::InvalidPayload(e.to_string())).into()
        })
    }

    /// Replace the payload.
    pub fn set_payload<P: TaskPayload>(&mut self, payload: &P) -> MindiaResult<()> {
        if self.name != P::TASK_NAME {
            return Err(SchedulerError::new(SchedulerErrorKind::PayloadMismatch {
                expected: P::TASK_NAME.to_string(),
                found: self.name.clone(),
            })
            .into());
        }
        self.details = encode(payload)?;
        Ok(())
    }

    /// Move to `Processing`, stamping the start time once.
    pub fn start(&mut self) {
        self.status = TaskStatus::Processing;
        self.started_at.get_or_insert_with(Utc::now);
    }

    /// Move to `Finished`, recording `error` if the job failed.
    pub fn finish(&mut self, error: Option<String>) {
        self.status = TaskStatus::Finished;
        self.error = error;
        self.finished_at = Some(Utc::now());
    }

    /// Move to `Canceled`.
    pub fn cancel(&mut self) {
        self.status = TaskStatus::Canceled;
        self.finished_at = Some(Utc::now());
    }
}

fn encode<P: TaskPayload>(payload: &P) -> MindiaResult<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| JsonError::new(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Alpha {
        value: String,
    }

    impl TaskPayload for Alpha {
        const TASK_NAME: &'static str = "alpha";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Beta;

    impl TaskPayload for Beta {
        const TASK_NAME: &'static str = "beta";
    }

    #[test]
    fn payload_tag_is_checked() {
        let task = Task::new(&Alpha { value: "x".into() }).unwrap();
        let err = task.payload::<Beta>().unwrap_err();
        assert!(format!("{}", err).contains("Payload mismatch"));
    }

    #[test]
    fn lifecycle_stamps() {
        let mut task = Task::new(&Alpha { value: "x".into() }).unwrap();
        task.start();
        let started = task.started_at;
        task.start();
        assert_eq!(task.started_at, started);
        assert!(!task.status.is_terminal());

        task.finish(Some("boom".into()));
        assert!(task.status.is_terminal());
        assert_eq!(task.error.as_deref(), Some("boom"));
        assert!(task.finished_at.is_some());
    }

    #[test]
    fn set_payload_replaces_details() {
        let mut task = Task::new(&Alpha { value: "x".into() }).unwrap();
        task.set_payload(&Alpha { value: "y".into() }).unwrap();
        assert_eq!(task.payload::<Alpha>().unwrap(), Alpha { value: "y".into() });
    }
}
