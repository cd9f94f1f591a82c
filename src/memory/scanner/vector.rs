//! 128-bit byte-lane vector used by the region scanners
//!
//! Lane `i` is byte `i` of the little-endian representation, so lane order
//! matches address order within a scan window.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Width in bytes of one scan window
pub const VECTOR_SIZE: usize = 16;

/// Sixteen byte lanes, each either 0x00 (no match) or 0xFF (match) once masked
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteVector(u128);

impl ByteVector {
    pub const ZERO: ByteVector = ByteVector(0);
    pub const ALL_BITS: ByteVector = ByteVector(u128::MAX);

    pub const fn from_bytes(bytes: [u8; VECTOR_SIZE]) -> Self {
        ByteVector(u128::from_le_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; VECTOR_SIZE] {
        self.0.to_le_bytes()
    }

    /// Builds a mask with lane `i` set when `set(i)` holds
    pub fn from_fn(set: impl Fn(usize) -> bool) -> Self {
        let mut bytes = [0u8; VECTOR_SIZE];
        for (lane, byte) in bytes.iter_mut().enumerate() {
            if set(lane) {
                *byte = 0xFF;
            }
        }
        ByteVector::from_bytes(bytes)
    }

    /// Lanes `start..VECTOR_SIZE` set
    pub const fn lanes_from(start: usize) -> Self {
        if start >= VECTOR_SIZE {
            ByteVector::ZERO
        } else {
            ByteVector(u128::MAX << (start * 8))
        }
    }

    /// Lanes `0..end` set
    pub const fn lanes_below(end: usize) -> Self {
        if end >= VECTOR_SIZE {
            ByteVector::ALL_BITS
        } else {
            ByteVector(!(u128::MAX << (end * 8)))
        }
    }

    /// Loads one window starting at `offset`. Bytes outside `buffer` read as zero.
    pub fn load(buffer: &[u8], offset: isize) -> Self {
        let mut bytes = [0u8; VECTOR_SIZE];

        if offset >= 0 && offset as usize + VECTOR_SIZE <= buffer.len() {
            let start = offset as usize;
            bytes.copy_from_slice(&buffer[start..start + VECTOR_SIZE]);
        } else {
            for (lane, byte) in bytes.iter_mut().enumerate() {
                let index = offset + lane as isize;
                if index >= 0 {
                    if let Some(value) = buffer.get(index as usize) {
                        *byte = *value;
                    }
                }
            }
        }

        ByteVector::from_bytes(bytes)
    }

    pub fn lane(self, index: usize) -> u8 {
        self.to_bytes()[index]
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// True when every lane is non-zero
    pub fn all_lanes_set(self) -> bool {
        self.to_bytes().iter().all(|&byte| byte != 0)
    }

    pub fn count_set_lanes(self) -> usize {
        self.to_bytes().iter().filter(|&&byte| byte != 0).count()
    }
}

impl BitAnd for ByteVector {
    type Output = ByteVector;

    fn bitand(self, rhs: ByteVector) -> ByteVector {
        ByteVector(self.0 & rhs.0)
    }
}

impl BitAndAssign for ByteVector {
    fn bitand_assign(&mut self, rhs: ByteVector) {
        self.0 &= rhs.0;
    }
}

impl BitOr for ByteVector {
    type Output = ByteVector;

    fn bitor(self, rhs: ByteVector) -> ByteVector {
        ByteVector(self.0 | rhs.0)
    }
}

impl BitOrAssign for ByteVector {
    fn bitor_assign(&mut self, rhs: ByteVector) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ByteVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteVector(")?;
        for byte in self.to_bytes() {
            write!(f, "{:02X}", byte)?;
        }
        write!(f, ")")
    }
}
