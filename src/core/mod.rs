//! Core module containing fundamental types for Memory-Scan
//!
//! This module provides the foundational building blocks used throughout
//! the engine: addresses, scan values, constraints and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, MemoryAlignment, MemoryError, MemoryResult, MemoryValue, ScanCompareType,
    ScanConstraints, ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
