//! Scan constraints: what a candidate value must satisfy

use super::alignment::MemoryAlignment;
use super::error::{MemoryError, MemoryResult};
use super::value::{MemoryValue, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison performed for every candidate offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanCompareType {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Changed,
    Unchanged,
    Increased,
    Decreased,
    IncreasedBy,
    DecreasedBy,
}

impl ScanCompareType {
    /// Checks if this comparison reads the previous-value buffer
    pub fn requires_previous(&self) -> bool {
        matches!(
            self,
            ScanCompareType::Changed
                | ScanCompareType::Unchanged
                | ScanCompareType::Increased
                | ScanCompareType::Decreased
                | ScanCompareType::IncreasedBy
                | ScanCompareType::DecreasedBy
        )
    }

    /// Checks if this comparison needs a literal compare value
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            ScanCompareType::Equal
                | ScanCompareType::NotEqual
                | ScanCompareType::GreaterThan
                | ScanCompareType::GreaterThanOrEqual
                | ScanCompareType::LessThan
                | ScanCompareType::LessThanOrEqual
                | ScanCompareType::IncreasedBy
                | ScanCompareType::DecreasedBy
        )
    }
}

impl FromStr for ScanCompareType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compare = match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "equal" | "==" => ScanCompareType::Equal,
            "ne" | "not_equal" | "!=" => ScanCompareType::NotEqual,
            "gt" | "greater_than" | ">" => ScanCompareType::GreaterThan,
            "ge" | "greater_than_or_equal" | ">=" => ScanCompareType::GreaterThanOrEqual,
            "lt" | "less_than" | "<" => ScanCompareType::LessThan,
            "le" | "less_than_or_equal" | "<=" => ScanCompareType::LessThanOrEqual,
            "changed" => ScanCompareType::Changed,
            "unchanged" => ScanCompareType::Unchanged,
            "increased" => ScanCompareType::Increased,
            "decreased" => ScanCompareType::Decreased,
            "increased_by" => ScanCompareType::IncreasedBy,
            "decreased_by" => ScanCompareType::DecreasedBy,
            other => {
                return Err(MemoryError::constraint_violation(format!(
                    "unknown comparison '{}'",
                    other
                )))
            }
        };
        Ok(compare)
    }
}

impl fmt::Display for ScanCompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single comparison and its optional literal operand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanConstraint {
    pub compare_type: ScanCompareType,
    pub value: Option<MemoryValue>,
}

impl ScanConstraint {
    pub fn new(compare_type: ScanCompareType, value: Option<MemoryValue>) -> Self {
        ScanConstraint {
            compare_type,
            value,
        }
    }
}

/// The full description of one scan pass. Every constraint must hold for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConstraints {
    pub value_type: ValueType,
    pub alignment: MemoryAlignment,
    pub constraints: Vec<ScanConstraint>,
}

impl ScanConstraints {
    /// Creates constraints with a single comparison
    pub fn new(
        value_type: ValueType,
        alignment: MemoryAlignment,
        compare_type: ScanCompareType,
        value: Option<MemoryValue>,
    ) -> Self {
        ScanConstraints {
            value_type,
            alignment,
            constraints: vec![ScanConstraint::new(compare_type, value)],
        }
    }

    /// Adds another comparison that must also hold
    pub fn and(mut self, compare_type: ScanCompareType, value: Option<MemoryValue>) -> Self {
        self.constraints.push(ScanConstraint::new(compare_type, value));
        self
    }

    /// Data type size in bytes
    pub fn data_type_size(&self) -> usize {
        self.value_type.size()
    }

    pub fn alignment_bytes(&self) -> usize {
        self.alignment.bytes()
    }

    /// Whether any comparison reads the previous-value buffer
    pub fn requires_previous(&self) -> bool {
        self.constraints
            .iter()
            .any(|constraint| constraint.compare_type.requires_previous())
    }

    /// Rejects malformed constraint sets before any region is touched
    pub fn validate(&self) -> MemoryResult<()> {
        if self.constraints.is_empty() {
            return Err(MemoryError::constraint_violation(
                "at least one comparison is required",
            ));
        }

        for constraint in &self.constraints {
            match (constraint.compare_type.requires_value(), constraint.value) {
                (true, None) => {
                    return Err(MemoryError::constraint_violation(format!(
                        "{} requires a compare value",
                        constraint.compare_type
                    )))
                }
                (false, Some(_)) => {
                    return Err(MemoryError::constraint_violation(format!(
                        "{} does not take a compare value",
                        constraint.compare_type
                    )))
                }
                (true, Some(value)) if value.value_type() != self.value_type => {
                    return Err(MemoryError::constraint_violation(format!(
                        "compare value {} is {} but the scan type is {}",
                        value,
                        value.value_type(),
                        self.value_type
                    )))
                }
                _ => {}
            }
        }

        Ok(())
    }
}
