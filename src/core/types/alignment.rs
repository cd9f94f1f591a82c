//! Byte boundaries at which candidate matches may start

use super::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alignment required of a candidate match address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum MemoryAlignment {
    Alignment1,
    Alignment2,
    Alignment4,
    Alignment8,
}

impl MemoryAlignment {
    pub const ALL: [MemoryAlignment; 4] = [
        MemoryAlignment::Alignment1,
        MemoryAlignment::Alignment2,
        MemoryAlignment::Alignment4,
        MemoryAlignment::Alignment8,
    ];

    /// Alignment in bytes
    pub const fn bytes(&self) -> usize {
        match self {
            MemoryAlignment::Alignment1 => 1,
            MemoryAlignment::Alignment2 => 2,
            MemoryAlignment::Alignment4 => 4,
            MemoryAlignment::Alignment8 => 8,
        }
    }
}

impl Default for MemoryAlignment {
    fn default() -> Self {
        MemoryAlignment::Alignment1
    }
}

impl TryFrom<usize> for MemoryAlignment {
    type Error = MemoryError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(MemoryAlignment::Alignment1),
            2 => Ok(MemoryAlignment::Alignment2),
            4 => Ok(MemoryAlignment::Alignment4),
            8 => Ok(MemoryAlignment::Alignment8),
            other => Err(MemoryError::constraint_violation(format!(
                "unsupported alignment {} (expected 1, 2, 4 or 8)",
                other
            ))),
        }
    }
}

impl From<MemoryAlignment> for usize {
    fn from(alignment: MemoryAlignment) -> Self {
        alignment.bytes()
    }
}

impl fmt::Display for MemoryAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-byte", self.bytes())
    }
}
