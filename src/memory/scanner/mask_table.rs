//! Precomputed lane masks keyed by (data type size, alignment)
//!
//! Staggered masks cover alignments finer than the data type size: entry `t`
//! selects, inside every `size`-byte element, the `alignment` lanes that start
//! at byte `t * alignment`. Sparse masks cover alignments coarser than the data
//! type size and keep only elements that begin on an alignment boundary.

use super::vector::ByteVector;
use crate::core::types::MemoryAlignment;
use std::collections::HashMap;

/// Data type sizes the vector comparer supports
pub const SUPPORTED_SIZES: [usize; 4] = [1, 2, 4, 8];

type MaskKey = (usize, MemoryAlignment);

lazy_static::lazy_static! {
    static ref STAGGERED_MASK_MAP: HashMap<MaskKey, Vec<ByteVector>> = build_staggered_masks();
    static ref SPARSE_MASK_MAP: HashMap<MaskKey, ByteVector> = build_sparse_masks();
}

fn build_staggered_masks() -> HashMap<MaskKey, Vec<ByteVector>> {
    let mut map = HashMap::new();

    for size in SUPPORTED_SIZES {
        for alignment in MemoryAlignment::ALL {
            let step = alignment.bytes();
            if step >= size {
                continue;
            }

            let masks = (0..size / step)
                .map(|offset| ByteVector::from_fn(|lane| (lane % size) / step == offset))
                .collect();
            map.insert((size, alignment), masks);
        }
    }

    map
}

fn build_sparse_masks() -> HashMap<MaskKey, ByteVector> {
    let mut map = HashMap::new();

    for size in SUPPORTED_SIZES {
        for alignment in MemoryAlignment::ALL {
            let step = alignment.bytes();
            if step <= size {
                continue;
            }
            map.insert(
                (size, alignment),
                ByteVector::from_fn(|lane| lane % step < size),
            );
        }
    }

    map
}

/// Per-offset masks for a staggered scan, one per offset inside an element
pub fn staggered_masks(size: usize, alignment: MemoryAlignment) -> Option<&'static [ByteVector]> {
    STAGGERED_MASK_MAP
        .get(&(size, alignment))
        .map(|masks| masks.as_slice())
}

/// Mask keeping only aligned element starts when alignment exceeds the size
pub fn sparse_mask(size: usize, alignment: MemoryAlignment) -> Option<ByteVector> {
    SPARSE_MASK_MAP.get(&(size, alignment)).copied()
}
