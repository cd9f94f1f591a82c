//! Snapshot scans run as trackable tasks

use crate::core::types::{MemoryResult, ScanConstraints};
use crate::memory::{MatchedRegion, Snapshot, SnapshotScanner};
use crate::tasks::{TaskScheduler, TrackableTask};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Matches of one scan plus the narrowed snapshot for the next scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanResults {
    pub matches: Vec<MatchedRegion>,
    #[serde(skip)]
    pub snapshot: Snapshot,
}

impl ScanResults {
    /// Number of candidate values across all matches
    pub fn result_count(&self, alignment: usize) -> usize {
        self.matches
            .iter()
            .map(|matched| matched.candidate_addresses(alignment).count())
            .sum()
    }
}

/// Runs [`SnapshotScanner`] scans in the background
#[derive(Clone)]
pub struct ManualScanner {
    scheduler: TaskScheduler,
    scanner: SnapshotScanner,
}

impl ManualScanner {
    pub const NAME: &'static str = "Manual Scan";

    pub fn new(scheduler: TaskScheduler, scanner: SnapshotScanner) -> Self {
        ManualScanner { scheduler, scanner }
    }

    /// Start scanning `snapshot` under `identifier`.
    ///
    /// Malformed constraints are rejected here, before a task exists. A
    /// canceled scan ends as [`crate::tasks::TaskOutcome::Canceled`] with no matches.
    pub fn scan(
        &self,
        snapshot: Arc<Snapshot>,
        constraints: ScanConstraints,
        identifier: impl Into<String>,
    ) -> MemoryResult<TrackableTask<ScanResults>> {
        constraints.validate()?;
        let scanner = self.scanner.clone();

        self.scheduler.create(Self::NAME, identifier, move |context| {
            let started = Instant::now();
            let matches = scanner.scan(&snapshot, &constraints, context)?;
            let narrowed = Snapshot::from_matches(&snapshot, &matches, &constraints)?;

            info!(
                matches = matches.len(),
                regions = narrowed.region_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "scan complete"
            );
            Ok(ScanResults {
                matches,
                snapshot: narrowed,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        Address, MemoryAlignment, MemoryError, MemoryValue, ScanCompareType, ValueType,
    };
    use crate::memory::SnapshotRegion;
    use crate::tasks::{TaskOutcome, TaskStatus};

    fn constraints(compare_type: ScanCompareType, value: Option<MemoryValue>) -> ScanConstraints {
        ScanConstraints::new(ValueType::U8, MemoryAlignment::Alignment1, compare_type, value)
    }

    #[tokio::test]
    async fn test_manual_scan_completes() {
        let mut bytes = vec![0u8; 32];
        bytes[0] = 7;
        bytes[5] = 7;
        let region = SnapshotRegion::new(Address::new(0x1000), bytes).unwrap();
        let snapshot = Arc::new(Snapshot::new(vec![region]).unwrap());

        let scanner = ManualScanner::new(
            TaskScheduler::current().unwrap(),
            SnapshotScanner::sequential(),
        );
        let task = scanner
            .scan(
                snapshot,
                constraints(ScanCompareType::Equal, Some(MemoryValue::U8(7))),
                "manual",
            )
            .unwrap();
        let states = task.subscribe();

        let results = task.result().await.into_option().unwrap();
        assert_eq!(
            results.matches,
            vec![
                MatchedRegion::new(Address::new(0x1000), 1),
                MatchedRegion::new(Address::new(0x1005), 1),
            ]
        );
        assert_eq!(results.result_count(1), 2);
        assert_eq!(results.snapshot.region_count(), 2);
        assert_eq!(states.borrow().status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_invalid_constraints_rejected_synchronously() {
        let scanner = ManualScanner::new(
            TaskScheduler::current().unwrap(),
            SnapshotScanner::sequential(),
        );
        let result = scanner.scan(
            Arc::new(Snapshot::default()),
            constraints(ScanCompareType::Equal, None),
            "manual",
        );
        assert!(matches!(result, Err(MemoryError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_delta_scan_without_previous_fails() {
        let region = SnapshotRegion::new(Address::new(0x1000), vec![0; 16]).unwrap();
        let scanner = ManualScanner::new(
            TaskScheduler::current().unwrap(),
            SnapshotScanner::sequential(),
        );
        let task = scanner
            .scan(
                Arc::new(Snapshot::new(vec![region]).unwrap()),
                constraints(ScanCompareType::Changed, None),
                "manual",
            )
            .unwrap();
        assert!(matches!(task.result().await, TaskOutcome::Failed(_)));
    }
}
