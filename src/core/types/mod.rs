//! Core type definitions for Memory-Scan
//!
//! This module contains the fundamental types used throughout the engine,
//! including addresses, scan values, alignment, constraints and error types.

mod address;
mod alignment;
mod constraint;
mod error;
mod process_info;
mod value;

// Re-export all public types
pub use address::Address;
pub use alignment::MemoryAlignment;
pub use constraint::{ScanCompareType, ScanConstraint, ScanConstraints};
pub use error::{MemoryError, MemoryResult};
pub use process_info::{EmulatorType, ProcessInfo};
pub use value::{MemoryValue, ValueType};

// Common type aliases
pub type ProcessId = u32;
