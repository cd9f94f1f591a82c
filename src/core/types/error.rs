//! Custom error types for Memory-Scan

use std::fmt;
use thiserror::Error;

/// Main error type for snapshot scanning and task scheduling
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Task conflict: a task with identifier '{identifier}' is already running")]
    TaskConflict { identifier: String },

    #[error("Operation canceled")]
    Canceled,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid snapshot region at {address}: {reason}")]
    InvalidRegion { address: String, reason: String },

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid value '{text}' for type {value_type}")]
    InvalidValue { text: String, value_type: String },

    #[error("Task '{name}' failed: {reason}")]
    TaskFailed { name: String, reason: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Async runtime unavailable: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for scan and task operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates a task conflict error
    pub fn conflict(identifier: impl Into<String>) -> Self {
        MemoryError::TaskConflict {
            identifier: identifier.into(),
        }
    }

    /// Creates a constraint violation error
    pub fn constraint_violation(reason: impl Into<String>) -> Self {
        MemoryError::ConstraintViolation(reason.into())
    }

    /// Creates an invalid region error
    pub fn invalid_region(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::InvalidRegion {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error
    pub fn invalid_value(text: impl Into<String>, value_type: impl fmt::Display) -> Self {
        MemoryError::InvalidValue {
            text: text.into(),
            value_type: value_type.to_string(),
        }
    }

    /// Creates a task failure error
    pub fn task_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        MemoryError::TaskFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True when a task creation was rejected because its identifier is in use
    pub fn is_conflict(&self) -> bool {
        matches!(self, MemoryError::TaskConflict { .. })
    }

    /// True when cooperative cancellation was observed
    pub fn is_canceled(&self) -> bool {
        matches!(self, MemoryError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MemoryError::conflict("scan");
        assert_eq!(
            err.to_string(),
            "Task conflict: a task with identifier 'scan' is already running"
        );

        let err = MemoryError::invalid_region("0x1000", "buffer shorter than length");
        assert_eq!(
            err.to_string(),
            "Invalid snapshot region at 0x1000: buffer shorter than length"
        );
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<(MemoryError, &str)> = vec![
            (MemoryError::Canceled, "Operation canceled"),
            (
                MemoryError::constraint_violation("missing value"),
                "Constraint violation: missing value",
            ),
            (
                MemoryError::InvalidAddress("0xZZ".to_string()),
                "Invalid memory address: 0xZZ",
            ),
            (
                MemoryError::invalid_value("abc", "u32"),
                "Invalid value 'abc' for type u32",
            ),
            (
                MemoryError::task_failed("Manual Scan", "panicked"),
                "Task 'Manual Scan' failed: panicked",
            ),
            (
                MemoryError::ThreadPool("no threads".to_string()),
                "Thread pool error: no threads",
            ),
            (
                MemoryError::Runtime("not inside a runtime".to_string()),
                "Async runtime unavailable: not inside a runtime",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_classifiers() {
        assert!(MemoryError::conflict("a").is_conflict());
        assert!(!MemoryError::conflict("a").is_canceled());
        assert!(MemoryError::Canceled.is_canceled());
        assert!(!MemoryError::Canceled.is_conflict());
    }

    #[test]
    fn test_from_implementations() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "dump");
        let mem_err: MemoryError = io_err.into();
        assert!(matches!(mem_err, MemoryError::IoError(_)));

        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let mem_err: MemoryError = json_err.into();
        assert!(matches!(mem_err, MemoryError::JsonError(_)));
    }
}
