//! Region scanners: drive the comparer across one region in vector-width steps

use super::comparer::{ScanElement, VectorComparer};
use super::encoder::RunLengthEncoder;
use super::mask_table;
use super::masks::RegionMasks;
use super::vector::{ByteVector, VECTOR_SIZE};
use super::ScanMonitor;
use crate::core::types::{MemoryError, MemoryResult, ScanConstraints, ValueType};
use crate::memory::snapshot::{MatchedRegion, SnapshotRegion};
use tracing::trace;

/// Scanner variant, chosen once per scan from the alignment and data type size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Alignment at least the data type size: one comparison per window.
    /// `lane_mask` keeps aligned element starts when alignment is coarser.
    Aligned { lane_mask: ByteVector },
    /// Alignment finer than the data type size: one comparison per offset
    /// inside an element, merged through the staggered mask table
    Staggered { masks: &'static [ByteVector] },
}

impl ScanStrategy {
    pub fn select(constraints: &ScanConstraints) -> MemoryResult<Self> {
        let size = constraints.data_type_size();
        let alignment = constraints.alignment_bytes();

        if VECTOR_SIZE % alignment != 0 || VECTOR_SIZE % size != 0 {
            return Err(MemoryError::constraint_violation(format!(
                "alignment {} and data type size {} must both divide the vector width {}",
                alignment, size, VECTOR_SIZE
            )));
        }

        if alignment == size {
            Ok(ScanStrategy::Aligned {
                lane_mask: ByteVector::ALL_BITS,
            })
        } else if alignment > size {
            mask_table::sparse_mask(size, constraints.alignment)
                .map(|lane_mask| ScanStrategy::Aligned { lane_mask })
                .ok_or_else(|| {
                    MemoryError::constraint_violation(format!(
                        "no sparse mask for size {} at {} alignment",
                        size, constraints.alignment
                    ))
                })
        } else {
            mask_table::staggered_masks(size, constraints.alignment)
                .map(|masks| ScanStrategy::Staggered { masks })
                .ok_or_else(|| {
                    MemoryError::constraint_violation(format!(
                        "no staggered masks for size {} at {} alignment",
                        size, constraints.alignment
                    ))
                })
        }
    }
}

/// Scans a single region, returning its matched ranges in ascending address order
pub fn scan_region(
    region: &SnapshotRegion,
    constraints: &ScanConstraints,
    strategy: ScanStrategy,
    monitor: &dyn ScanMonitor,
) -> MemoryResult<Vec<MatchedRegion>> {
    match constraints.value_type {
        ValueType::I8 => scan_region_as::<i8>(region, constraints, strategy, monitor),
        ValueType::I16 => scan_region_as::<i16>(region, constraints, strategy, monitor),
        ValueType::I32 => scan_region_as::<i32>(region, constraints, strategy, monitor),
        ValueType::I64 => scan_region_as::<i64>(region, constraints, strategy, monitor),
        ValueType::U8 => scan_region_as::<u8>(region, constraints, strategy, monitor),
        ValueType::U16 => scan_region_as::<u16>(region, constraints, strategy, monitor),
        ValueType::U32 => scan_region_as::<u32>(region, constraints, strategy, monitor),
        ValueType::U64 => scan_region_as::<u64>(region, constraints, strategy, monitor),
        ValueType::F32 => scan_region_as::<f32>(region, constraints, strategy, monitor),
        ValueType::F64 => scan_region_as::<f64>(region, constraints, strategy, monitor),
    }
}

fn scan_region_as<T: ScanElement>(
    region: &SnapshotRegion,
    constraints: &ScanConstraints,
    strategy: ScanStrategy,
    monitor: &dyn ScanMonitor,
) -> MemoryResult<Vec<MatchedRegion>> {
    let alignment = constraints.alignment_bytes();
    let Some(masks) = RegionMasks::build(region.base_address(), region.length(), alignment, T::SIZE)
    else {
        trace!(region = %region.base_address(), length = region.length(), "no aligned value fits");
        return Ok(Vec::new());
    };

    let comparer = VectorComparer::<T>::new(region, constraints)?;
    let encoder = RunLengthEncoder::new(region.base_address().align_down(alignment));

    match strategy {
        ScanStrategy::Aligned { lane_mask } => {
            scan_aligned(&comparer, &masks, lane_mask, encoder, monitor)
        }
        ScanStrategy::Staggered { masks: staggered } => {
            scan_staggered(&comparer, &masks, staggered, alignment, encoder, monitor)
        }
    }
}

/// One comparison per window, advancing a full vector each step
fn scan_aligned<T: ScanElement>(
    comparer: &VectorComparer<'_, T>,
    masks: &RegionMasks,
    lane_mask: ByteVector,
    mut encoder: RunLengthEncoder,
    monitor: &dyn ScanMonitor,
) -> MemoryResult<Vec<MatchedRegion>> {
    let mut read_offset = masks.first_window_offset();

    for step in 0..masks.scan_count {
        if monitor.is_canceled() {
            return Err(MemoryError::Canceled);
        }

        let results = masks.apply(step, comparer.compare(read_offset) & lane_mask);
        encoder.encode_vector(results);
        read_offset += VECTOR_SIZE as isize;
    }

    Ok(encoder.finish())
}

/// `size / alignment` comparisons per window, each shifted by one alignment step
/// and narrowed to the lanes its offset owns before being merged
fn scan_staggered<T: ScanElement>(
    comparer: &VectorComparer<'_, T>,
    masks: &RegionMasks,
    staggered: &[ByteVector],
    alignment: usize,
    mut encoder: RunLengthEncoder,
    monitor: &dyn ScanMonitor,
) -> MemoryResult<Vec<MatchedRegion>> {
    let scan_count_per_vector = T::SIZE / alignment;
    debug_assert_eq!(staggered.len(), scan_count_per_vector);
    let offset_vector_increment = (VECTOR_SIZE - alignment * scan_count_per_vector) as isize;
    let mut read_offset = masks.first_window_offset();

    for step in 0..masks.scan_count {
        if monitor.is_canceled() {
            return Err(MemoryError::Canceled);
        }

        let mut results = ByteVector::ZERO;
        for mask in staggered {
            results |= comparer.compare(read_offset) & *mask;
            read_offset += alignment as isize;
        }

        encoder.encode_vector(masks.apply(step, results));
        read_offset += offset_vector_increment;
    }

    Ok(encoder.finish())
}
