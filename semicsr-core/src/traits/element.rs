//! Matrix element type constraints
//!
//! This module defines the trait that constrains what numeric types can be
//! stored in a matrix and combined by the semirings.

use crate::format::DataType;

/// Trait for types that can be stored as matrix elements
///
/// Elements are plain-old-data so value arrays can be reinterpreted as
/// bytes for snapshots. Besides the arithmetic constants, every element
/// type names a sentinel (`INFINITY`) that the tropical semiring uses as
/// its zero: `INFINITY` for floats and `MAX` for integers.
pub trait MatrixElement:
    bytemuck::Pod
    + PartialEq
    + PartialOrd
    + core::fmt::Debug
    + core::fmt::Display
    + core::str::FromStr
    + Send
    + Sync
    + 'static
{
    /// Additive identity
    const ZERO: Self;

    /// Multiplicative identity
    const ONE: Self;

    /// Absent/infinite sentinel for min-plus arithmetic
    const INFINITY: Self;

    /// Get the DataType tag for this element type
    fn data_type() -> DataType;

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Ordinary addition
    ///
    /// Integers wrap on overflow in every build profile, so arithmetic
    /// products are computed modulo `2^BITS`.
    fn plus(self, other: Self) -> Self;

    /// Ordinary multiplication, wrapping like [`MatrixElement::plus`]
    fn times(self, other: Self) -> Self;

    /// Addition that never wraps past the sentinel
    ///
    /// Integers saturate at `MAX`; floats rely on IEEE infinity.
    fn saturating_plus(self, other: Self) -> Self;

    /// Smaller of two values
    fn minimum(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Convert to f64 for reporting
    fn to_f64(self) -> f64;

    /// Reorder bytes from native to little-endian (no-op on LE targets)
    fn to_le(self) -> Self;

    /// Reorder bytes from little-endian to native
    fn from_le(self) -> Self;
}

impl MatrixElement for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const INFINITY: Self = f32::INFINITY;

    fn data_type() -> DataType {
        DataType::F32
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn times(self, other: Self) -> Self {
        self * other
    }

    fn saturating_plus(self, other: Self) -> Self {
        self + other
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn to_le(self) -> Self {
        f32::from_bits(self.to_bits().to_le())
    }

    fn from_le(self) -> Self {
        f32::from_bits(u32::from_le(self.to_bits()))
    }
}

impl MatrixElement for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const INFINITY: Self = f64::INFINITY;

    fn data_type() -> DataType {
        DataType::F64
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn times(self, other: Self) -> Self {
        self * other
    }

    fn saturating_plus(self, other: Self) -> Self {
        self + other
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn to_le(self) -> Self {
        f64::from_bits(self.to_bits().to_le())
    }

    fn from_le(self) -> Self {
        f64::from_bits(u64::from_le(self.to_bits()))
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $tag:expr) => {
        impl MatrixElement for $ty {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const INFINITY: Self = <$ty>::MAX;

            fn data_type() -> DataType {
                $tag
            }

            fn plus(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            fn times(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            fn saturating_plus(self, other: Self) -> Self {
                self.saturating_add(other)
            }

            fn minimum(self, other: Self) -> Self {
                Ord::min(self, other)
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_le(self) -> Self {
                <$ty>::to_le(self)
            }

            fn from_le(self) -> Self {
                <$ty>::from_le(self)
            }
        }
    };
}

impl_integer_element!(i32, DataType::I32);
impl_integer_element!(i64, DataType::I64);
impl_integer_element!(u32, DataType::U32);
impl_integer_element!(u64, DataType::U64);
