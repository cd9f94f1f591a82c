//! Handles to running tasks and the context their bodies run with

use super::cancellation::CancellationToken;
use crate::core::types::{MemoryError, MemoryResult};
use crate::memory::ScanMonitor;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;

/// Lifecycle of a task. Completed, Canceled and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Canceled,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Canceled | TaskStatus::Failed
        )
    }
}

/// Observable state of a task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub status: TaskStatus,
    /// Percentage complete, 0 to 100
    pub progress: f32,
}

impl TaskState {
    pub(crate) fn pending() -> Self {
        TaskState {
            status: TaskStatus::Pending,
            progress: 0.0,
        }
    }
}

/// How a task ended
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Completed(T),
    /// Cancellation was observed; there is no result
    Canceled,
    /// The task body failed or panicked
    Failed(String),
}

impl<T> TaskOutcome<T> {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Completed(_) => TaskStatus::Completed,
            TaskOutcome::Canceled => TaskStatus::Canceled,
            TaskOutcome::Failed(_) => TaskStatus::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskOutcome::Canceled)
    }

    /// The result, if the task completed
    pub fn into_option(self) -> Option<T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// The result, or `default` for a canceled or failed task
    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

/// What a task body sees: its cancellation flag and a progress sink
#[derive(Debug)]
pub struct TaskContext {
    name: String,
    cancellation: CancellationToken,
    state: watch::Sender<TaskState>,
}

impl TaskContext {
    pub(crate) fn new(
        name: String,
        cancellation: CancellationToken,
        state: watch::Sender<TaskState>,
    ) -> Self {
        TaskContext {
            name,
            cancellation,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_canceled(&self) -> bool {
        self.cancellation.is_canceled()
    }

    /// Returns `Err(Canceled)` once cancellation has been requested
    pub fn check_canceled(&self) -> MemoryResult<()> {
        if self.is_canceled() {
            Err(MemoryError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Publishes progress, clamped to 0..=100
    pub fn update_progress(&self, percent: f32) {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        self.state.send_modify(|state| state.progress = percent);
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.state.send_modify(|state| {
            state.status = status;
            if status == TaskStatus::Completed {
                state.progress = 100.0;
            }
        });
    }
}

impl ScanMonitor for TaskContext {
    fn is_canceled(&self) -> bool {
        TaskContext::is_canceled(self)
    }

    fn report_progress(&self, percent: f32) {
        self.update_progress(percent);
    }
}

/// Caller-side handle to a scheduled task.
///
/// Dropping the handle before awaiting [`TrackableTask::result`] cancels the task.
#[derive(Debug)]
pub struct TrackableTask<T> {
    name: String,
    identifier: String,
    cancellation: CancellationToken,
    state: watch::Receiver<TaskState>,
    handle: Option<JoinHandle<TaskOutcome<T>>>,
}

impl<T> TrackableTask<T> {
    pub(crate) fn new(
        name: String,
        identifier: String,
        cancellation: CancellationToken,
        state: watch::Receiver<TaskState>,
        handle: JoinHandle<TaskOutcome<T>>,
    ) -> Self {
        TrackableTask {
            name,
            identifier,
            cancellation,
            state,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> TaskStatus {
        self.state.borrow().status
    }

    pub fn progress(&self) -> f32 {
        self.state.borrow().progress
    }

    /// Requests cooperative cancellation
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancellation.is_canceled()
    }

    /// Token that cancels this task, usable after the handle is consumed
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// True once the task body has returned
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Receiver notified on every status or progress change
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.clone()
    }

    /// Waits for the task to reach a terminal state.
    ///
    /// Abandoning the returned future before it resolves cancels the task.
    pub async fn result(mut self) -> TaskOutcome<T> {
        let joined = match self.handle.as_mut() {
            Some(handle) => handle.await,
            None => return TaskOutcome::Failed("task result was already taken".to_string()),
        };
        self.handle = None;

        match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(task = %self.name, identifier = %self.identifier, error = %e, "task worker was lost");
                TaskOutcome::Failed(e.to_string())
            }
        }
    }
}

impl<T> Drop for TrackableTask<T> {
    fn drop(&mut self) {
        // Still holding the join handle means nobody will read the outcome
        if self.handle.is_some() {
            self.cancellation.cancel();
        }
    }
}
