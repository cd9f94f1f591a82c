//! Edge masks for a single region scan
//!
//! Scan windows start at the region base rounded down to the alignment, so the
//! first window may begin before the region and the last may run past it. The
//! misalignment mask clears lanes ahead of the first aligned candidate; the
//! overread mask clears lanes whose value would extend past the region end.

use super::vector::{ByteVector, VECTOR_SIZE};
use crate::core::types::Address;

/// Window layout and edge masks for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionMasks {
    /// Bytes between the aligned window origin and the region base
    pub misalignment: usize,
    /// Region offset one past the last lane a match may set
    pub range_end: usize,
    /// Number of vector-width steps covering the candidate range
    pub scan_count: usize,
    /// Applied to the first step
    pub misalignment_mask: ByteVector,
    /// Applied to the final step
    pub overread_mask: ByteVector,
}

impl RegionMasks {
    /// Builds the masks for a region, or `None` when no aligned value fits inside it
    pub fn build(
        base_address: Address,
        length: usize,
        alignment: usize,
        data_type_size: usize,
    ) -> Option<Self> {
        let misalignment = base_address.misalignment(alignment);
        let first_candidate = if misalignment == 0 {
            0
        } else {
            alignment - misalignment
        };

        if first_candidate + data_type_size > length {
            return None;
        }

        let last_candidate =
            first_candidate + (length - data_type_size - first_candidate) / alignment * alignment;
        let range_end = last_candidate + alignment.min(data_type_size);

        // Window positions are region offsets shifted by the misalignment
        let scan_count = (misalignment + range_end).div_ceil(VECTOR_SIZE);
        let final_window_start = (scan_count - 1) * VECTOR_SIZE;

        Some(RegionMasks {
            misalignment,
            range_end,
            scan_count,
            misalignment_mask: ByteVector::lanes_from(misalignment + first_candidate),
            overread_mask: ByteVector::lanes_below(misalignment + range_end - final_window_start),
        })
    }

    /// Region offset at which the first window starts (negative when misaligned)
    pub fn first_window_offset(&self) -> isize {
        -(self.misalignment as isize)
    }

    /// Applies the edge masks belonging to `step`
    #[inline]
    pub fn apply(&self, step: usize, mut results: ByteVector) -> ByteVector {
        if step == 0 {
            results &= self.misalignment_mask;
        }
        if step + 1 == self.scan_count {
            results &= self.overread_mask;
        }
        results
    }
}
