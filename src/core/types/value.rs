//! Scan value types and literal compare values

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A literal value of one of the scannable data types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl MemoryValue {
    /// Returns the size in bytes of the value
    pub fn size(&self) -> usize {
        self.value_type().size()
    }

    /// Decodes a little-endian value of the given type from the front of `bytes`
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        let bytes = bytes.get(..value_type.size())?;
        let value = match value_type {
            ValueType::I8 => MemoryValue::I8(i8::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I16 => MemoryValue::I16(i16::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I32 => MemoryValue::I32(i32::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I64 => MemoryValue::I64(i64::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U8 => MemoryValue::U8(bytes[0]),
            ValueType::U16 => MemoryValue::U16(u16::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U32 => MemoryValue::U32(u32::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U64 => MemoryValue::U64(u64::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::F32 => MemoryValue::F32(f32::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::F64 => MemoryValue::F64(f64::from_le_bytes(bytes.try_into().ok()?)),
        };
        Some(value)
    }

    /// Parses a literal of the given type. Integers accept a `0x` hex prefix.
    pub fn parse(text: &str, value_type: ValueType) -> MemoryResult<Self> {
        let trimmed = text.trim();
        let invalid = || MemoryError::invalid_value(trimmed, value_type);

        macro_rules! parse_int {
            ($ty:ty, $variant:ident) => {{
                let parsed = match trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                {
                    // Hex literals are bit patterns, so 0xFF is valid for i8.
                    Some(hex) => <$ty>::from_str_radix(hex, 16).ok().or_else(|| {
                        u64::from_str_radix(hex, 16)
                            .ok()
                            .filter(|raw| raw.leading_zeros() as usize >= 64 - 8 * value_type.size())
                            .map(|raw| raw as $ty)
                    }),
                    None => trimmed.parse::<$ty>().ok(),
                };
                parsed.map(MemoryValue::$variant).ok_or_else(invalid)
            }};
        }

        match value_type {
            ValueType::I8 => parse_int!(i8, I8),
            ValueType::I16 => parse_int!(i16, I16),
            ValueType::I32 => parse_int!(i32, I32),
            ValueType::I64 => parse_int!(i64, I64),
            ValueType::U8 => parse_int!(u8, U8),
            ValueType::U16 => parse_int!(u16, U16),
            ValueType::U32 => parse_int!(u32, U32),
            ValueType::U64 => parse_int!(u64, U64),
            ValueType::F32 => trimmed.parse().map(MemoryValue::F32).map_err(|_| invalid()),
            ValueType::F64 => trimmed.parse().map(MemoryValue::F64).map_err(|_| invalid()),
        }
    }

    /// Gets the value type enum for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::I8(_) => ValueType::I8,
            MemoryValue::I16(_) => ValueType::I16,
            MemoryValue::I32(_) => ValueType::I32,
            MemoryValue::I64(_) => ValueType::I64,
            MemoryValue::U8(_) => ValueType::U8,
            MemoryValue::U16(_) => ValueType::U16,
            MemoryValue::U32(_) => ValueType::U32,
            MemoryValue::U64(_) => ValueType::U64,
            MemoryValue::F32(_) => ValueType::F32,
            MemoryValue::F64(_) => ValueType::F64,
        }
    }
}

/// Data type a scan interprets each candidate offset as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ValueType {
    /// Returns the size in bytes for this value type
    pub const fn size(&self) -> usize {
        match self {
            ValueType::I8 | ValueType::U8 => 1,
            ValueType::I16 | ValueType::U16 => 2,
            ValueType::I32 | ValueType::U32 | ValueType::F32 => 4,
            ValueType::I64 | ValueType::U64 | ValueType::F64 => 8,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "i8" => Ok(ValueType::I8),
            "i16" => Ok(ValueType::I16),
            "i32" => Ok(ValueType::I32),
            "i64" => Ok(ValueType::I64),
            "u8" => Ok(ValueType::U8),
            "u16" => Ok(ValueType::U16),
            "u32" => Ok(ValueType::U32),
            "u64" => Ok(ValueType::U64),
            "f32" => Ok(ValueType::F32),
            "f64" => Ok(ValueType::F64),
            other => Err(MemoryError::constraint_violation(format!(
                "unknown value type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::I8(v) => write!(f, "{}", v),
            MemoryValue::I16(v) => write!(f, "{}", v),
            MemoryValue::I32(v) => write!(f, "{}", v),
            MemoryValue::I64(v) => write!(f, "{}", v),
            MemoryValue::U8(v) => write!(f, "{}", v),
            MemoryValue::U16(v) => write!(f, "{}", v),
            MemoryValue::U32(v) => write!(f, "{}", v),
            MemoryValue::U64(v) => write!(f, "{}", v),
            MemoryValue::F32(v) => write!(f, "{}", v),
            MemoryValue::F64(v) => write!(f, "{}", v),
        }
    }
}
