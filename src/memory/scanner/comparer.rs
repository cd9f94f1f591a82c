//! Lane-wise comparison of one scan window against the scan constraints

use super::vector::{ByteVector, VECTOR_SIZE};
use crate::core::types::{MemoryError, MemoryResult, MemoryValue, ScanCompareType, ScanConstraints};
use crate::memory::snapshot::SnapshotRegion;

/// A fixed-size little-endian value a window can be split into
pub trait ScanElement: Copy + PartialEq + PartialOrd + Send + Sync + 'static {
    const SIZE: usize;

    /// Decodes from exactly `SIZE` bytes
    fn read(bytes: &[u8]) -> Self;

    fn from_value(value: MemoryValue) -> Option<Self>;

    /// Wrapping for integers
    fn offset_by(self, delta: Self) -> Self;

    /// Wrapping for integers
    fn offset_back(self, delta: Self) -> Self;
}

macro_rules! impl_int_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl ScanElement for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn from_value(value: MemoryValue) -> Option<Self> {
                match value {
                    MemoryValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn offset_by(self, delta: Self) -> Self {
                self.wrapping_add(delta)
            }

            #[inline]
            fn offset_back(self, delta: Self) -> Self {
                self.wrapping_sub(delta)
            }
        }
    )*};
}

macro_rules! impl_float_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl ScanElement for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn from_value(value: MemoryValue) -> Option<Self> {
                match value {
                    MemoryValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn offset_by(self, delta: Self) -> Self {
                self + delta
            }

            #[inline]
            fn offset_back(self, delta: Self) -> Self {
                self - delta
            }
        }
    )*};
}

impl_int_element!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
);
impl_float_element!(f32 => F32, f64 => F64);

#[derive(Debug, Clone, Copy)]
struct CompiledConstraint<T> {
    compare_type: ScanCompareType,
    value: Option<T>,
}

/// Compares windows of one region's buffers against a bound constraint set
#[derive(Debug)]
pub struct VectorComparer<'a, T: ScanElement> {
    current: &'a [u8],
    previous: Option<&'a [u8]>,
    constraints: Vec<CompiledConstraint<T>>,
}

impl<'a, T: ScanElement> VectorComparer<'a, T> {
    pub fn new(region: &'a SnapshotRegion, constraints: &ScanConstraints) -> MemoryResult<Self> {
        if T::SIZE != constraints.data_type_size() {
            return Err(MemoryError::constraint_violation(format!(
                "comparer element size {} does not match {}",
                T::SIZE,
                constraints.value_type
            )));
        }

        let previous = if constraints.requires_previous() {
            Some(region.previous_bytes().ok_or_else(|| {
                MemoryError::constraint_violation(format!(
                    "region at {} has no previous values",
                    region.base_address()
                ))
            })?)
        } else {
            None
        };

        let compiled = constraints
            .constraints
            .iter()
            .map(|constraint| {
                let value = match constraint.value {
                    Some(value) => Some(T::from_value(value).ok_or_else(|| {
                        MemoryError::constraint_violation(format!(
                            "compare value {} is not a {}",
                            value, constraints.value_type
                        ))
                    })?),
                    None => None,
                };
                Ok(CompiledConstraint {
                    compare_type: constraint.compare_type,
                    value,
                })
            })
            .collect::<MemoryResult<Vec<_>>>()?;

        Ok(VectorComparer {
            current: region.current_bytes(),
            previous,
            constraints: compiled,
        })
    }

    /// Compares the window starting at region offset `offset`.
    ///
    /// Every lane of an element is set when that element satisfies all constraints.
    #[inline]
    pub fn compare(&self, offset: isize) -> ByteVector {
        let current = ByteVector::load(self.current, offset).to_bytes();
        let previous = self
            .previous
            .map(|previous| ByteVector::load(previous, offset).to_bytes());

        let mut results = [0u8; VECTOR_SIZE];
        for (index, lanes) in results.chunks_exact_mut(T::SIZE).enumerate() {
            let start = index * T::SIZE;
            let current_bytes = &current[start..start + T::SIZE];
            let previous_bytes = previous.as_ref().map(|bytes| &bytes[start..start + T::SIZE]);

            if self.element_matches(current_bytes, previous_bytes) {
                lanes.fill(0xFF);
            }
        }

        ByteVector::from_bytes(results)
    }

    #[inline]
    fn element_matches(&self, current_bytes: &[u8], previous_bytes: Option<&[u8]>) -> bool {
        let current = T::read(current_bytes);
        let previous = previous_bytes.map(T::read);

        self.constraints.iter().all(|constraint| {
            match (constraint.compare_type, constraint.value, previous) {
                (ScanCompareType::Equal, Some(value), _) => current == value,
                (ScanCompareType::NotEqual, Some(value), _) => current != value,
                (ScanCompareType::GreaterThan, Some(value), _) => current > value,
                (ScanCompareType::GreaterThanOrEqual, Some(value), _) => current >= value,
                (ScanCompareType::LessThan, Some(value), _) => current < value,
                (ScanCompareType::LessThanOrEqual, Some(value), _) => current <= value,
                // Raw bytes, so float NaN payloads compare like any other value
                (ScanCompareType::Changed, _, Some(_)) => Some(current_bytes) != previous_bytes,
                (ScanCompareType::Unchanged, _, Some(_)) => Some(current_bytes) == previous_bytes,
                (ScanCompareType::Increased, _, Some(previous)) => current > previous,
                (ScanCompareType::Decreased, _, Some(previous)) => current < previous,
                (ScanCompareType::IncreasedBy, Some(value), Some(previous)) => {
                    current == previous.offset_by(value)
                }
                (ScanCompareType::DecreasedBy, Some(value), Some(previous)) => {
                    current == previous.offset_back(value)
                }
                _ => false,
            }
        })
    }
}
