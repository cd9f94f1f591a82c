//! Memory-Scan: vectorized snapshot scanning with cancelable scan tasks
//!
//! Memory is handed over as a [`memory::Snapshot`] of regions. A
//! [`memory::SnapshotScanner`] compares every region against
//! [`core::types::ScanConstraints`] a vector at a time and returns the matching
//! address ranges. Long-running work is wrapped in [`tasks::TrackableTask`]s so
//! callers can observe progress and cancel it.

pub mod config;
pub mod core;
pub mod memory;
pub mod scanners;
pub mod tasks;

// Re-export main types from core module
pub use core::types::{
    Address, EmulatorType, MemoryAlignment, MemoryError, MemoryResult, MemoryValue, ProcessId,
    ProcessInfo, ScanCompareType, ScanConstraint, ScanConstraints, ValueType,
};

pub use memory::{MatchedRegion, ScanMonitor, ScanOptions, Snapshot, SnapshotRegion, SnapshotScanner};
pub use scanners::{EmulatorDetector, ManualScanner, ScanResults};
pub use tasks::{CancellationToken, TaskOutcome, TaskScheduler, TaskStatus, TrackableTask};

// Re-export core directly for full access
pub use core::{AUTHORS, VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_memory_value_reexport() {
        let value = MemoryValue::U32(42);
        assert_eq!(value.value_type(), ValueType::U32);
        assert_eq!(value.size(), 4);

        let f64_val = MemoryValue::F64(std::f64::consts::PI);
        assert_eq!(f64_val.value_type(), ValueType::F64);
    }

    #[test]
    fn test_scan_reexports() {
        let region = SnapshotRegion::new(Address::new(0x2000), vec![1, 2, 3, 4]).unwrap();
        let snapshot = Snapshot::new(vec![region]).unwrap();
        let constraints = ScanConstraints::new(
            ValueType::U16,
            MemoryAlignment::Alignment2,
            ScanCompareType::Equal,
            Some(MemoryValue::U16(0x0403)),
        );

        let matches = SnapshotScanner::sequential()
            .scan(&snapshot, &constraints, &memory::Unmonitored)
            .unwrap();
        assert_eq!(matches, vec![MatchedRegion::new(Address::new(0x2002), 2)]);
    }

    #[test]
    fn test_memory_error_reexport() {
        let error = MemoryError::conflict("scan-1");
        assert!(error.is_conflict());
        assert!(error.to_string().contains("scan-1"));

        let result: MemoryResult<u32> = Err(MemoryError::Canceled);
        assert!(result.unwrap_err().is_canceled());
    }
}
