//! Vectorized snapshot scanning
//!
//! A scan binds [`ScanConstraints`] to a [`Snapshot`] and walks every region in
//! vector-width windows:
//! - [`comparer`] evaluates the constraints lane-wise for one window
//! - [`masks`] and [`mask_table`] clear lanes outside the aligned candidate range
//! - [`region`] drives the aligned or staggered variant over a region
//! - [`encoder`] collapses the lane stream into matched ranges

pub mod comparer;
pub mod encoder;
pub mod mask_table;
pub mod masks;
pub mod region;
pub mod vector;

pub use comparer::{ScanElement, VectorComparer};
pub use encoder::RunLengthEncoder;
pub use masks::RegionMasks;
pub use region::{scan_region, ScanStrategy};
pub use vector::{ByteVector, VECTOR_SIZE};

use crate::config::Config;
use crate::core::types::{MemoryError, MemoryResult, ScanConstraints};
use crate::memory::snapshot::{MatchedRegion, Snapshot, SnapshotRegion};
use rayon::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Receives progress from a running scan and tells it when to stop
pub trait ScanMonitor: Sync {
    /// Polled at the start of every region and every vector step
    fn is_canceled(&self) -> bool {
        false
    }

    /// Percentage of regions completed, 0 to 100
    fn report_progress(&self, _percent: f32) {}
}

/// A monitor that never cancels and ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmonitored;

impl ScanMonitor for Unmonitored {}

/// Options for snapshot scanning
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Scan regions concurrently on a dedicated thread pool
    pub parallel: bool,
    /// Size of that pool
    pub max_threads: usize,
    /// Regions completed between progress reports
    pub progress_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            parallel: true,
            max_threads: num_cpus::get().min(8),
            progress_interval: 1,
        }
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        ScanOptions {
            parallel: config.scanner.parallel,
            max_threads: config.scanner.max_threads,
            progress_interval: config.tasks.progress_interval,
        }
    }
}

/// Scans snapshots against constraints
#[derive(Clone)]
pub struct SnapshotScanner {
    options: ScanOptions,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl SnapshotScanner {
    /// Create a new snapshot scanner, building its thread pool when parallel
    pub fn new(options: ScanOptions) -> MemoryResult<Self> {
        let pool = if options.parallel && options.max_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.max_threads)
                .thread_name(|index| format!("memory-scan-{}", index))
                .build()
                .map_err(|e| MemoryError::ThreadPool(e.to_string()))?;
            Some(Arc::new(pool))
        } else {
            None
        };

        Ok(SnapshotScanner { options, pool })
    }

    /// A scanner that walks regions on the calling thread
    pub fn sequential() -> Self {
        SnapshotScanner {
            options: ScanOptions {
                parallel: false,
                ..ScanOptions::default()
            },
            pool: None,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan every region of `snapshot`.
    ///
    /// Constraints are validated before any region is read. Results keep region
    /// order. A region that fails is logged and skipped; cancellation aborts the
    /// whole scan with [`MemoryError::Canceled`].
    pub fn scan(
        &self,
        snapshot: &Snapshot,
        constraints: &ScanConstraints,
        monitor: &dyn ScanMonitor,
    ) -> MemoryResult<Vec<MatchedRegion>> {
        let strategy = Self::prepare(snapshot, constraints)?;
        debug!(
            regions = snapshot.region_count(),
            bytes = snapshot.byte_count(),
            value_type = %constraints.value_type,
            alignment = %constraints.alignment,
            ?strategy,
            "starting snapshot scan"
        );

        if monitor.is_canceled() {
            return Err(MemoryError::Canceled);
        }

        let total = snapshot.region_count();
        // Counted and reported under one lock so progress never goes backwards
        let completed = Mutex::new(0usize);
        let interval = self.options.progress_interval.max(1);

        let scan_one = |region: &SnapshotRegion| -> MemoryResult<Vec<MatchedRegion>> {
            if monitor.is_canceled() {
                return Err(MemoryError::Canceled);
            }
            let result = scan_region(region, constraints, strategy, monitor);

            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            *done += 1;
            if *done % interval == 0 || *done == total {
                monitor.report_progress(*done as f32 * 100.0 / total as f32);
            }
            drop(done);
            result
        };

        let per_region: Vec<MemoryResult<Vec<MatchedRegion>>> = match &self.pool {
            Some(pool) => pool.install(|| snapshot.regions().par_iter().map(scan_one).collect()),
            None => snapshot.regions().iter().map(scan_one).collect(),
        };

        let mut matches = Vec::new();
        for (region, result) in snapshot.regions().iter().zip(per_region) {
            match result {
                Ok(found) => matches.extend(found),
                Err(MemoryError::Canceled) => return Err(MemoryError::Canceled),
                Err(e) => {
                    warn!(region = %region.base_address(), error = %e, "skipping region after scan failure");
                }
            }
        }

        debug!(matches = matches.len(), "snapshot scan finished");
        Ok(matches)
    }

    /// Validates constraints against the snapshot and selects the scanner variant
    fn prepare(snapshot: &Snapshot, constraints: &ScanConstraints) -> MemoryResult<ScanStrategy> {
        constraints.validate()?;
        let strategy = ScanStrategy::select(constraints)?;

        if constraints.requires_previous() {
            if let Some(region) = snapshot.regions().iter().find(|region| !region.has_previous()) {
                return Err(MemoryError::constraint_violation(format!(
                    "delta comparison needs previous values but region at {} has none",
                    region.base_address()
                )));
            }
        }

        Ok(strategy)
    }
}
