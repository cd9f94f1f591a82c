//! Target-process address wrapper with hex parsing and alignment helpers

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An address inside the scanned process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Number of bytes this address sits past the previous `alignment` boundary
    pub const fn misalignment(&self, alignment: usize) -> usize {
        if alignment == 0 {
            return 0;
        }
        self.0 % alignment
    }

    /// Aligns the address down to the specified boundary
    pub const fn align_down(&self, alignment: usize) -> Self {
        Address(self.0 - self.misalignment(alignment))
    }

    /// Adds a byte offset, failing on address-space overflow
    pub fn checked_add(&self, offset: usize) -> MemoryResult<Self> {
        self.0
            .checked_add(offset)
            .map(Address)
            .ok_or_else(|| MemoryError::InvalidAddress(format!("{} + 0x{:X} overflows", self, offset)))
    }

    /// Adds a byte offset. Callers guarantee the sum stays inside a region.
    pub const fn add(&self, offset: usize) -> Self {
        Address(self.0 + offset)
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            usize::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            usize::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            usize::from_str_radix(s, 16)
        } else {
            s.parse::<usize>()
        };

        value
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}
