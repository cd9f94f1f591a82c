//! Snapshot model and vectorized scanning
//!
//! This module provides:
//! - Snapshots of process memory handed over by an external memory provider
//! - Region scanners that compare snapshot bytes against scan constraints
//! - Run-length encoding of matches into contiguous address ranges

pub mod scanner;
pub mod snapshot;

pub use scanner::{ScanMonitor, ScanOptions, SnapshotScanner, Unmonitored};
pub use snapshot::{MatchedRegion, Snapshot, SnapshotRegion};
