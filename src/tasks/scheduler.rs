//! Task scheduler with identifier-based deduplication

use super::cancellation::CancellationToken;
use super::trackable::{TaskContext, TaskOutcome, TaskState, TaskStatus, TrackableTask};
use crate::core::types::{MemoryError, MemoryResult};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Runs task bodies on the blocking pool of a tokio runtime.
///
/// At most one task per identifier is active at a time. The identifier is
/// released before the task's terminal state becomes observable, so a caller
/// reacting to completion can immediately schedule the same work again.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    runtime: Handle,
    active: Arc<Mutex<HashSet<String>>>,
}

impl TaskScheduler {
    pub fn new(runtime: Handle) -> Self {
        TaskScheduler {
            runtime,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Scheduler bound to the runtime of the calling context
    pub fn current() -> MemoryResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| MemoryError::Runtime(e.to_string()))
    }

    /// Start `body` as a trackable task.
    ///
    /// Fails with [`MemoryError::TaskConflict`] while another task with the same
    /// identifier is still active. The body polls its [`TaskContext`] for
    /// cancellation; returning `Err(Canceled)` ends the task as canceled, any
    /// other error or a panic ends it as failed.
    pub fn create<T, F>(
        &self,
        name: impl Into<String>,
        identifier: impl Into<String>,
        body: F,
    ) -> MemoryResult<TrackableTask<T>>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> MemoryResult<T> + Send + 'static,
    {
        let name = name.into();
        let identifier = identifier.into();

        let registration = match self.register(&identifier) {
            Ok(registration) => registration,
            Err(e) => {
                warn!(task = %name, identifier = %identifier, "task with this identifier is already running");
                return Err(e);
            }
        };

        let cancellation = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(TaskState::pending());
        let context = TaskContext::new(name.clone(), cancellation.clone(), state_tx);

        let handle = self
            .runtime
            .spawn_blocking(move || run_task(registration, context, body));

        info!(task = %name, identifier = %identifier, "task started");
        Ok(TrackableTask::new(
            name,
            identifier,
            cancellation,
            state_rx,
            handle,
        ))
    }

    /// Check if a task with this identifier is active
    pub fn is_active(&self, identifier: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(identifier)
    }

    /// Get the number of active tasks
    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn register(&self, identifier: &str) -> MemoryResult<Registration> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(identifier.to_string()) {
            return Err(MemoryError::conflict(identifier));
        }

        Ok(Registration {
            identifier: identifier.to_string(),
            active: Arc::clone(&self.active),
        })
    }
}

/// Holds an identifier in the active set until dropped
struct Registration {
    identifier: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.identifier);
    }
}

fn run_task<T, F>(registration: Registration, context: TaskContext, body: F) -> TaskOutcome<T>
where
    F: FnOnce(&TaskContext) -> MemoryResult<T>,
{
    let outcome = if context.is_canceled() {
        TaskOutcome::Canceled
    } else {
        context.set_status(TaskStatus::Running);
        match panic::catch_unwind(AssertUnwindSafe(|| body(&context))) {
            Ok(Ok(value)) => TaskOutcome::Completed(value),
            Ok(Err(MemoryError::Canceled)) => TaskOutcome::Canceled,
            Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
            Err(payload) => TaskOutcome::Failed(panic_message(payload.as_ref())),
        }
    };

    match &outcome {
        TaskOutcome::Completed(_) => debug!(task = %context.name(), "task completed"),
        TaskOutcome::Canceled => info!(task = %context.name(), "task canceled"),
        TaskOutcome::Failed(reason) => error!(task = %context.name(), %reason, "task failed"),
    }

    drop(registration);
    context.set_status(outcome.status());
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("task panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("task panicked: {}", message)
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for_cancel(context: &TaskContext) -> MemoryResult<u32> {
        loop {
            context.check_canceled()?;
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[tokio::test]
    async fn test_completed_task() {
        let scheduler = TaskScheduler::current().unwrap();
        let task = scheduler
            .create("sum", "sum-1", |context| {
                context.update_progress(50.0);
                Ok(40 + 2)
            })
            .unwrap();
        assert_eq!(task.name(), "sum");
        assert_eq!(task.identifier(), "sum-1");

        let states = task.subscribe();
        assert_eq!(task.result().await, TaskOutcome::Completed(42));
        assert_eq!(
            *states.borrow(),
            TaskState {
                status: TaskStatus::Completed,
                progress: 100.0
            }
        );
        assert!(!scheduler.is_active("sum-1"));
    }

    #[tokio::test]
    async fn test_duplicate_identifier_conflicts() {
        let scheduler = TaskScheduler::current().unwrap();
        let first = scheduler.create("wait", "same", wait_for_cancel).unwrap();
        assert!(scheduler.is_active("same"));

        let second = scheduler.create("wait", "same", wait_for_cancel);
        assert!(matches!(second, Err(MemoryError::TaskConflict { .. })));
        assert_eq!(scheduler.active_count(), 1);

        first.cancel();
        assert_eq!(first.result().await, TaskOutcome::Canceled);
        assert_eq!(scheduler.active_count(), 0);

        let third = scheduler.create("quick", "same", |_| Ok(1u32)).unwrap();
        assert_eq!(third.result().await, TaskOutcome::Completed(1));
    }

    #[tokio::test]
    async fn test_failure_and_panic_become_failed() {
        let scheduler = TaskScheduler::current().unwrap();

        let failing = scheduler
            .create("fail", "fail", |_| -> MemoryResult<u32> {
                Err(MemoryError::Runtime("no data".to_string()))
            })
            .unwrap();
        match failing.result().await {
            TaskOutcome::Failed(reason) => assert!(reason.contains("no data")),
            other => panic!("unexpected outcome {:?}", other),
        }

        let panicking = scheduler
            .create("panic", "panic", |_| -> MemoryResult<u32> { panic!("exploded") })
            .unwrap();
        match panicking.result().await {
            TaskOutcome::Failed(reason) => assert!(reason.contains("exploded")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_current_outside_runtime() {
        assert!(matches!(
            TaskScheduler::current(),
            Err(MemoryError::Runtime(_))
        ));
    }
}
