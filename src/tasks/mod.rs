//! Cancelable background tasks
//!
//! Long-running work (scans, process inspection) runs as a [`TrackableTask`]
//! created through a [`TaskScheduler`]. Callers can observe progress, request
//! cancellation and await the [`TaskOutcome`].

pub mod cancellation;
pub mod scheduler;
pub mod trackable;

pub use cancellation::CancellationToken;
pub use scheduler::TaskScheduler;
pub use trackable::{TaskContext, TaskOutcome, TaskState, TaskStatus, TrackableTask};
